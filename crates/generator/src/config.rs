//! Configuration loading and validation for the generator binary.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to the `awses-encrypt` manifest to load. **Required.**
    pub manifest_path: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
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

    pub fn manifest_path(&self) -> &Path {
        Path::new(&self.manifest_path)
    }

    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.manifest_path, "MANIFEST_PATH")?;
        ensure_non_empty(&self.log_level, "LOG_LEVEL")?;
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
