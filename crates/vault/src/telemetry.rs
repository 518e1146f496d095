//! Telemetry initialisation for embedders of the vault core.
//!
//! A lightweight setup: structured JSON logs only. The core has no network
//! egress, so there is no exporter pipeline; the embedding application owns
//! anything beyond stdout.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialise the tracing subscriber.
///
/// Outputs structured JSON logs to stdout at the configured log level;
/// `RUST_LOG` in the environment takes precedence over `log_level`.
///
/// # Errors
///
/// Returns an error if a subscriber has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing subscriber: {e}"))
}
