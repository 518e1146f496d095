//! Configuration loading and validation for the vault core.
//!
//! All values are read from environment variables, with defaults suitable for
//! a demo deployment. Embedders load once at startup and hand the validated
//! struct to [`crate::VaultService`].

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated vault configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Upper bound on accepted plaintext size, in bytes.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_max_message_bytes() -> usize {
    64 * 1024
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.log_level.trim().is_empty() {
            anyhow::bail!("LOG_LEVEL must not be empty");
        }
        if self.max_message_bytes == 0 {
            anyhow::bail!("MAX_MESSAGE_BYTES must be > 0");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}
