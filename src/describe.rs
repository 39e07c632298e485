//! Offline jobs that fill the description table from a text-generation service.
//!
//! Both jobs are sequential loops around a flaky network dependency:
//!   - `describe_catalog` tops every game up to `target` descriptions
//!   - `repair_fallbacks` regenerates stored fallback phrases in place
//!
//! The table is persisted after each game, so killing the process loses at most
//! the game in flight and a rerun resumes from disk.

use std::path::Path;
use std::time::Duration;

use tracing::{error, info, instrument, warn};

use crate::catalog::{save_descriptions, StoreError};
use crate::cleaner::{clean, is_fallback, FALLBACK_DESCRIPTION};
use crate::config::RetryConfig;
use crate::domain::{DescriptionTable, Game};
use crate::llm::TextGenerator;
use crate::util::fill_template;

/// Something that can wait. Production sleeps on the tokio timer; tests record.
pub trait Sleeper {
  async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
  async fn sleep(&self, duration: Duration) {
    tokio::time::sleep(duration).await;
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Consecutive fallback results after which a game is given up.
  pub max_attempts: u32,
  /// Extra attempts per slot when repairing.
  pub repair_attempts: u32,
  /// Wait after a fallback result.
  pub backoff: Duration,
  /// Wait after a good description.
  pub pacing: Duration,
  /// Wait between games.
  pub cooldown: Duration,
  /// Descriptions wanted per game.
  pub target: usize,
}

impl From<&RetryConfig> for RetryPolicy {
  fn from(c: &RetryConfig) -> Self {
    Self {
      max_attempts: c.max_attempts.max(1),
      repair_attempts: c.repair_attempts,
      backoff: Duration::from_secs(c.backoff_secs),
      pacing: Duration::from_secs(c.pacing_secs),
      cooldown: Duration::from_secs(c.cooldown_secs),
      target: c.target,
    }
  }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DescribeReport {
  pub completed: usize,
  pub skipped: usize,
  /// Titles that ran out of retries below `target`.
  pub incomplete: Vec<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RepairReport {
  pub repaired: usize,
  pub still_fallback: usize,
}

pub struct DescriptionJob<G, S> {
  generator: G,
  sleeper: S,
  template: String,
  policy: RetryPolicy,
}

impl<G: TextGenerator, S: Sleeper> DescriptionJob<G, S> {
  pub fn new(generator: G, sleeper: S, template: impl Into<String>, policy: RetryPolicy) -> Self {
    Self { generator, sleeper, template: template.into(), policy }
  }

  /// One generation attempt. Never fails: service errors and unusable text both
  /// come back as the fallback phrase.
  #[instrument(level = "debug", skip(self))]
  pub async fn describe_game(&self, title: &str) -> String {
    let prompt = fill_template(&self.template, &[("title", title)]);
    match self.generator.generate(&prompt).await {
      Ok(raw) => clean(&raw),
      Err(e) => {
        error!(target: "describe", %title, error = %e, "Generation failed; using fallback");
        FALLBACK_DESCRIPTION.to_string()
      }
    }
  }

  /// Generate until `target` descriptions are held or `max_attempts`
  /// consecutive fallbacks were seen. Stored fallbacks are dropped first.
  async fn collect(&self, title: &str, mut descriptions: Vec<String>) -> Vec<String> {
    descriptions.retain(|d| !is_fallback(d));
    let mut failures = 0;

    while descriptions.len() < self.policy.target {
      let desc = self.describe_game(title).await;

      if is_fallback(&desc) {
        failures += 1;
        if failures >= self.policy.max_attempts {
          warn!(target: "describe", %title, held = descriptions.len(), "Max retries reached; moving on");
          break;
        }
        warn!(target: "describe", %title, attempt = failures, max = self.policy.max_attempts, backoff = ?self.policy.backoff, "Fallback result; backing off");
        self.sleeper.sleep(self.policy.backoff).await;
        continue;
      }

      info!(target: "describe", %title, description = %desc, "Description accepted");
      descriptions.push(desc);
      failures = 0;
      self.sleeper.sleep(self.policy.pacing).await;
    }

    descriptions
  }

  /// Fill the table for every catalog game holding fewer than `target`
  /// descriptions, saving to `path` after each game.
  #[instrument(level = "info", skip_all, fields(games = catalog.len(), path = %path.display()))]
  pub async fn describe_catalog(
    &self,
    catalog: &[Game],
    table: &mut DescriptionTable,
    path: &Path,
  ) -> Result<DescribeReport, StoreError> {
    let mut report = DescribeReport::default();
    let pending: Vec<&Game> = catalog
      .iter()
      .filter(|g| table.get(&g.title).map_or(0, Vec::len) < self.policy.target)
      .collect();
    report.skipped = catalog.len() - pending.len();
    info!(target: "describe", pending = pending.len(), skipped = report.skipped, "Starting description run");

    for (i, game) in pending.iter().enumerate() {
      info!(target: "describe", title = %game.title, "Describing");
      let existing = table.remove(&game.title).unwrap_or_default();
      let descriptions = self.collect(&game.title, existing).await;

      if descriptions.len() < self.policy.target {
        report.incomplete.push(game.title.clone());
      } else {
        report.completed += 1;
      }
      table.insert(game.title.clone(), descriptions);
      save_descriptions(path, table)?;
      info!(target: "describe", title = %game.title, "Saved");

      if i + 1 < pending.len() {
        self.sleeper.sleep(self.policy.cooldown).await;
      }
    }

    Ok(report)
  }

  /// Replace every stored fallback phrase with a fresh description, retrying each
  /// slot up to `repair_attempts` extra times. Saves after each touched game.
  #[instrument(level = "info", skip_all, fields(titles = table.len(), path = %path.display()))]
  pub async fn repair_fallbacks(
    &self,
    table: &mut DescriptionTable,
    path: &Path,
  ) -> Result<RepairReport, StoreError> {
    let mut report = RepairReport::default();
    let titles: Vec<String> = table
      .iter()
      .filter(|(_, descs)| descs.iter().any(|d| is_fallback(d)))
      .map(|(title, _)| title.clone())
      .collect();

    for title in titles {
      let slots: Vec<usize> = table[&title]
        .iter()
        .enumerate()
        .filter(|(_, d)| is_fallback(d))
        .map(|(i, _)| i)
        .collect();
      info!(target: "describe", %title, slots = slots.len(), "Repairing fallback descriptions");

      for idx in slots {
        let mut desc = self.describe_game(&title).await;
        let mut retries = 0;
        while is_fallback(&desc) && retries < self.policy.repair_attempts {
          warn!(target: "describe", %title, retry = retries + 1, "Fallback again; backing off");
          self.sleeper.sleep(self.policy.backoff).await;
          desc = self.describe_game(&title).await;
          retries += 1;
        }

        if is_fallback(&desc) {
          report.still_fallback += 1;
        } else {
          report.repaired += 1;
        }
        if let Some(slot) = table.get_mut(&title).and_then(|d| d.get_mut(idx)) {
          *slot = desc;
        }
        self.sleeper.sleep(self.policy.pacing).await;
      }

      save_descriptions(path, table)?;
    }

    info!(target: "describe", repaired = report.repaired, still_fallback = report.still_fallback, "Repair finished");
    Ok(report)
  }
}
