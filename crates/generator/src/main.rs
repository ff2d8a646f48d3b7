//! `generator`: encrypt manifest loader entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Load the encrypt manifest and resolve every scenario.
//! 4. Log a summary of each resolved scenario.

use anyhow::{Context, Result};
use tracing::info;

use generator::config::Config;
use generator::{telemetry, EncryptManifest};

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        manifest = %cfg.manifest_path,
        "generator starting"
    );

    // -----------------------------------------------------------------------
    // 3. Manifest
    // -----------------------------------------------------------------------
    let manifest = EncryptManifest::from_file(cfg.manifest_path())
        .with_context(|| format!("failed to load encrypt manifest {}", cfg.manifest_path))?;

    // -----------------------------------------------------------------------
    // 4. Summary
    // -----------------------------------------------------------------------
    for (index, scenario) in manifest.tests.iter().enumerate() {
        let providers: Vec<String> = scenario
            .master_key_provider
            .members()
            .map(|key| format!("{}:{}", key.provider_id(), key.key_id()))
            .collect();
        info!(
            scenario = index,
            algorithm = %scenario.algorithm.string_id(),
            frame_size = scenario.frame_size,
            plaintext = %scenario.plaintext_name,
            plaintext_len = scenario.plaintext.len(),
            master_keys = ?providers,
            "scenario resolved"
        );
    }

    Ok(())
}
