//! Encrypt test-vector generator.
//!
//! Reads an `awses-encrypt` manifest, generates the plaintexts it declares,
//! resolves each scenario's algorithm suite and master keys against a keys
//! manifest, and writes the encrypted results plus an `awses-decrypt` manifest
//! through a caller-supplied [`MessageEncryptor`](manifest::MessageEncryptor).

pub mod algorithm;
pub mod config;
pub mod keys;
pub mod manifest;
pub mod master_key;
pub mod telemetry;

pub use manifest::{write_to_dir, EncryptManifest, ManifestError, ResolvedScenario};
