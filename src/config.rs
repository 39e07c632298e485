//! Loading application configuration (data paths, retry policy, prompts) from TOML.
//!
//! Every section is optional; a missing file or section falls back to defaults.
//! See `AppConfig` for the expected schema.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read { path: PathBuf, source: std::io::Error },
  #[error("failed to parse config {path}: {source}")]
  Parse { path: PathBuf, source: toml::de::Error },
}

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
  pub data: DataConfig,
  pub server: ServerConfig,
  pub retry: RetryConfig,
  pub prompts: Prompts,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DataConfig {
  pub catalog_path: PathBuf,
  pub descriptions_path: PathBuf,
}

impl Default for DataConfig {
  fn default() -> Self {
    Self {
      catalog_path: "games.json".into(),
      descriptions_path: "game_descriptions.json".into(),
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub session_ttl_secs: u64,
  pub static_dir: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self { session_ttl_secs: 1800, static_dir: "./static".into() }
  }
}

impl ServerConfig {
  pub fn session_ttl(&self) -> Duration {
    Duration::from_secs(self.session_ttl_secs)
  }
}

/// Retry numbers for the offline description jobs, in seconds.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
  /// Consecutive fallback results before giving up on a game.
  pub max_attempts: u32,
  /// Extra attempts per slot when repairing stored fallbacks.
  pub repair_attempts: u32,
  pub backoff_secs: u64,
  pub pacing_secs: u64,
  pub cooldown_secs: u64,
  /// Descriptions wanted per game.
  pub target: usize,
}

impl Default for RetryConfig {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      repair_attempts: 5,
      backoff_secs: 60,
      pacing_secs: 5,
      cooldown_secs: 30,
      target: 5,
    }
  }
}

/// Prompt sent to the text-generation service; `{title}` is replaced with the game title.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub description_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self { description_template: DEFAULT_DESCRIPTION_TEMPLATE.into() }
  }
}

const DEFAULT_DESCRIPTION_TEMPLATE: &str = r#"In exactly 5 words, describe the core mechanics of '{title}' in a hilarious and quirky way.

Rules:
- Your response must be exactly 5 words
- Must be a complete thought within those 5 words, not cut off mid-sentence
- Do not wrap your response in quotation marks
- Use only plain text, no special characters, no emojis or formatting
- Do not use the game's name, character names, genre labels, or words from the title
- Include unique details to distinguish it from similar games

Examples:
Minesweeper - Guessing with explosive consequences
Doom - Angry metal shotguns demon confetti
Halo - Space monks argue with bullets
Pong - Two lines chasing one ball
Left 4 Dead - Friendships tested by screaming zombies
Pac-Man - Circle in relentless fruit binge
Asteroids - Blast rocks make smaller problems

Respond with only the 5-word description based on the rules provided. Do not return anything else."#;

/// Load config from an explicit path, else from HINT_CONFIG_PATH, else defaults.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
  let path = match path {
    Some(p) => p.to_path_buf(),
    None => match std::env::var("HINT_CONFIG_PATH") {
      Ok(p) => PathBuf::from(p),
      Err(_) => {
        info!(target: "weakest_hint", "No config file given; using defaults");
        return Ok(AppConfig::default());
      }
    },
  };

  let raw = std::fs::read_to_string(&path)
    .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
  let cfg = toml::from_str::<AppConfig>(&raw)
    .map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
  info!(target: "weakest_hint", path = %path.display(), "Loaded config (TOML)");
  Ok(cfg)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_toml_keeps_defaults() {
    let cfg: AppConfig = toml::from_str(
      r#"
        [retry]
        backoff_secs = 1

        [data]
        catalog_path = "data/games.json"
      "#,
    )
    .unwrap();

    assert_eq!(cfg.retry.backoff_secs, 1);
    assert_eq!(cfg.retry.max_attempts, 3);
    assert_eq!(cfg.data.catalog_path, PathBuf::from("data/games.json"));
    assert_eq!(cfg.data.descriptions_path, PathBuf::from("game_descriptions.json"));
    assert_eq!(cfg.server.session_ttl(), Duration::from_secs(1800));
    assert!(cfg.prompts.description_template.contains("{title}"));
  }

  #[test]
  fn missing_file_is_an_error() {
    let err = load_config(Some(Path::new("/nonexistent/weakest-hint.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
  }
}
