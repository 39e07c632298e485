//! JSON files backing the quiz: the game catalog and the description table.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{DescriptionTable, Game};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("failed to read {path}: {source}")]
  Read { path: PathBuf, source: std::io::Error },
  #[error("failed to write {path}: {source}")]
  Write { path: PathBuf, source: std::io::Error },
  #[error("invalid JSON in {path}: {source}")]
  Json { path: PathBuf, source: serde_json::Error },
}

/// Load the catalog: a JSON array of `{"game": .., "genre": ..}` records.
pub fn load_catalog(path: &Path) -> Result<Vec<Game>, StoreError> {
  let raw = fs::read_to_string(path)
    .map_err(|source| StoreError::Read { path: path.to_path_buf(), source })?;
  let games: Vec<Game> = serde_json::from_str(&raw)
    .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })?;
  info!(target: "weakest_hint", path = %path.display(), games = games.len(), "Loaded catalog");
  Ok(games)
}

/// Load the description table. A missing file is an empty table so a first
/// batch run can start from nothing.
pub fn load_descriptions(path: &Path) -> Result<DescriptionTable, StoreError> {
  let raw = match fs::read_to_string(path) {
    Ok(raw) => raw,
    Err(e) if e.kind() == ErrorKind::NotFound => {
      warn!(target: "weakest_hint", path = %path.display(), "Description table not found; starting empty");
      return Ok(DescriptionTable::new());
    }
    Err(source) => return Err(StoreError::Read { path: path.to_path_buf(), source }),
  };
  let table: DescriptionTable = serde_json::from_str(&raw)
    .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })?;
  info!(target: "weakest_hint", path = %path.display(), titles = table.len(), "Loaded description table");
  Ok(table)
}

/// Persist the table atomically: write a sibling temp file, then rename over the
/// target. A crash mid-write leaves the previous table intact.
pub fn save_descriptions(path: &Path, table: &DescriptionTable) -> Result<(), StoreError> {
  let json = serde_json::to_string_pretty(table)
    .map_err(|source| StoreError::Json { path: path.to_path_buf(), source })?;

  let mut tmp = path.as_os_str().to_owned();
  tmp.push(".tmp");
  let tmp = PathBuf::from(tmp);

  fs::write(&tmp, json).map_err(|source| StoreError::Write { path: tmp.clone(), source })?;
  fs::rename(&tmp, path).map_err(|source| StoreError::Write { path: path.to_path_buf(), source })?;
  Ok(())
}

/// Titles in the catalog without any stored description.
pub fn undescribed<'a>(catalog: &'a [Game], table: &DescriptionTable) -> Vec<&'a str> {
  catalog
    .iter()
    .filter(|g| table.get(&g.title).map_or(true, |d| d.is_empty()))
    .map(|g| g.title.as_str())
    .collect()
}
