//! The Weakest Hint · guess the video game from a bad one-line description
//!
//! Subcommands:
//!   serve     : Axum HTTP quiz API + static browser client (./static)
//!   describe  : fill the description table through a text-generation service
//!   repair    : regenerate stored fallback descriptions
//!
//! Important env variables (a `.env` file is honored):
//!   PORT             : u16 (default 3000)
//!   HINT_CONFIG_PATH : path to TOML config (data paths, retry policy, prompt)
//!   LLM_API_KEY      : required by `describe` and `repair`
//!   LLM_BASE_URL     : default "https://router.huggingface.co/v1"
//!   LLM_MODEL        : default "google/gemma-2-2b-it"
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

mod catalog;
mod cleaner;
mod config;
mod describe;
mod domain;
mod llm;
mod logic;
mod protocol;
mod questions;
mod routes;
mod state;
mod telemetry;
mod util;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{load_config, AppConfig};
use crate::describe::{DescriptionJob, RetryPolicy, TokioSleeper};
use crate::llm::ChatClient;
use crate::routes::build_router;
use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "weakest-hint", about = "Video game guessing quiz and its description generator", version)]
struct Cli {
  /// TOML config file (overrides HINT_CONFIG_PATH).
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Run the quiz web server.
  Serve,
  /// Generate descriptions for catalog games that have fewer than the target count.
  Describe,
  /// Regenerate descriptions that were stored as the fallback phrase.
  Repair,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  dotenv::dotenv().ok();
  telemetry::init_tracing();

  let cli = Cli::parse();
  let cfg = load_config(cli.config.as_deref())?;

  match cli.command {
    Command::Serve => serve(cfg).await,
    Command::Describe => describe(cfg, false).await,
    Command::Repair => describe(cfg, true).await,
  }
}

async fn serve(cfg: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
  let catalog = catalog::load_catalog(&cfg.data.catalog_path)?;
  let descriptions = catalog::load_descriptions(&cfg.data.descriptions_path)?;
  if catalog.len() < questions::MIN_CATALOG_SIZE {
    warn!(target: "weakest_hint", games = catalog.len(), needed = questions::MIN_CATALOG_SIZE, "Catalog too small; quizzes will fail to start");
  }

  let state = Arc::new(AppState::new(catalog, descriptions, cfg.server.session_ttl()));
  let app = build_router(state, &cfg.server.static_dir);

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "weakest_hint", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "weakest_hint", "HTTP server exited");
  Ok(())
}

async fn describe(cfg: AppConfig, repair: bool) -> Result<(), Box<dyn std::error::Error>> {
  let client = ChatClient::from_env()?;
  info!(target: "weakest_hint", base_url = %client.base_url, model = %client.model, "Text generation enabled");

  let path = &cfg.data.descriptions_path;
  let mut table = catalog::load_descriptions(path)?;
  let job = DescriptionJob::new(
    client,
    TokioSleeper,
    cfg.prompts.description_template.clone(),
    RetryPolicy::from(&cfg.retry),
  );

  if repair {
    let report = job.repair_fallbacks(&mut table, path).await?;
    info!(target: "weakest_hint", repaired = report.repaired, still_fallback = report.still_fallback, "Repair done");
  } else {
    let catalog = catalog::load_catalog(&cfg.data.catalog_path)?;
    let report = job.describe_catalog(&catalog, &mut table, path).await?;
    info!(target: "weakest_hint", completed = report.completed, skipped = report.skipped, incomplete = ?report.incomplete, "Description run done");
  }
  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    let _ = tokio::signal::ctrl_c().await;
  };
  #[cfg(unix)]
  let terminate = async {
    use tokio::signal::unix::{signal, SignalKind};
    if let Ok(mut stream) = signal(SignalKind::terminate()) {
      let _ = stream.recv().await;
    }
  };
  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
}
