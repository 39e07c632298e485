//! Telemetry initialization (tracing/tracing-subscriber), shared by the server
//! and the batch subcommands.
//!
//! - LOG_LEVEL overrides [`DEFAULT_FILTER`] (e.g. "debug" or "info,describe=debug").
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//!
//! Targets in use: `quiz` (question generation), `describe` (batch jobs),
//! `weakest_hint` (startup and storage). TraceLayer adds per-request spans under `tower_http`.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,quiz=info,describe=info,weakest_hint=debug,tower_http=info,axum=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // `json()` changes the builder type, so each arm initializes on its own.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}
