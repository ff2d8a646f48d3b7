//! Encrypt manifest loading, scenario resolution, and result writing.
//!
//! # Responsibilities
//!
//! - Parse an `awses-encrypt` manifest and validate its type and version.
//! - Load the keys manifest it references, relative to the manifest's own
//!   directory.
//! - Generate each named plaintext once and share it across scenarios.
//! - Resolve every scenario, in manifest order, into a [`ResolvedScenario`].
//! - Hand resolved scenarios to a [`MessageEncryptor`] and write the
//!   ciphertexts plus an `awses-decrypt` result manifest ([`write_to_dir`]).
//!
//! Loading is all-or-nothing: the first failing scenario aborts the load and
//! no partial scenario list is returned.

pub mod plaintext;
pub mod scenario;
pub mod writer;

pub use plaintext::PlaintextStore;
pub use scenario::{ResolvedScenario, ScenarioError};
pub use writer::{write_to_dir, EncryptError, MessageEncryptor, WriteError};

use std::{
    io,
    path::{Path, PathBuf},
};

use common::{
    manifest::{EncryptManifestDocument, ENCRYPT_MANIFEST_TYPE},
    validate_manifest_type, HeaderError,
};
use thiserror::Error;
use tracing::info;

use crate::keys::{KeyStore, KeysError};

/// Encrypt manifest versions this reader understands.
pub const SUPPORTED_VERSIONS: &[u64] = &[1];

/// The only URI scheme accepted for the keys reference.
const FILE_SCHEME: &str = "file://";

/// Errors produced while loading an encrypt manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The manifest is not valid JSON or does not have the expected shape.
    #[error("malformed manifest: {0}")]
    Parse(#[source] serde_json::Error),

    /// The manifest declares the wrong type or an unsupported version.
    #[error(transparent)]
    UnsupportedManifest(#[from] HeaderError),

    /// The keys reference uses a scheme other than `file://`.
    #[error("unsupported keys reference {0}: only file:// URIs are supported")]
    UnsupportedReferenceScheme(String),

    /// The keys reference is an absolute path rather than manifest-relative.
    #[error("keys reference {0} must be relative to the manifest directory")]
    AbsoluteReference(String),

    /// The keys manifest failed to load.
    #[error(transparent)]
    Keys(#[from] KeysError),

    /// Two `plaintexts` entries share a name.
    #[error("duplicate plaintext name: {0}")]
    DuplicatePlaintext(String),

    /// A plaintext size cannot be allocated on this platform.
    #[error("plaintext {name} is too large: {size} bytes")]
    PlaintextTooLarge { name: String, size: u64 },

    /// A scenario failed to resolve; `index` is its position in `tests`.
    #[error("scenario {index}: {source}")]
    Scenario {
        index: usize,
        #[source]
        source: ScenarioError,
    },
}

/// A fully loaded encrypt manifest, ready to be executed.
#[derive(Debug, Clone)]
pub struct EncryptManifest {
    pub version: u64,
    pub keys: KeyStore,
    pub plaintexts: PlaintextStore,
    /// Resolved scenarios, in manifest order.
    pub tests: Vec<ResolvedScenario>,
}

impl EncryptManifest {
    /// Read the manifest at `path` and load it relative to its own directory.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Io`] if the file cannot be read or its path
    /// cannot be resolved, otherwise any error from [`EncryptManifest::load`].
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let io_err = |source: io::Error| ManifestError::Io {
            path: path.to_owned(),
            source,
        };
        let document = std::fs::read_to_string(path).map_err(io_err)?;
        let absolute = path.canonicalize().map_err(io_err)?;
        let manifest_dir = absolute.parent().unwrap_or(absolute.as_path());
        Self::load(&document, manifest_dir)
    }

    /// Load a manifest from its JSON text.
    ///
    /// `manifest_dir` is the directory the keys reference is resolved against.
    ///
    /// # Errors
    ///
    /// See [`ManifestError`]; every variant aborts the whole load.
    pub fn load(document: &str, manifest_dir: &Path) -> Result<Self, ManifestError> {
        let raw: serde_json::Value = serde_json::from_str(document).map_err(ManifestError::Parse)?;
        let version = validate_manifest_type(&raw, ENCRYPT_MANIFEST_TYPE, SUPPORTED_VERSIONS)?;

        // Parsed again from text: a generic JSON map would merge repeated plaintext names.
        let parsed: EncryptManifestDocument =
            serde_json::from_str(document).map_err(ManifestError::Parse)?;

        let keys = KeyStore::from_file(&resolve_keys_reference(manifest_dir, &parsed.keys)?)?;
        let plaintexts = PlaintextStore::generate(&parsed.plaintexts)?;

        let tests = parsed
            .tests
            .iter()
            .enumerate()
            .map(|(index, scenario)| {
                ResolvedScenario::resolve(scenario, &keys, &plaintexts)
                    .map_err(|source| ManifestError::Scenario { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            version,
            keys = keys.len(),
            plaintexts = plaintexts.len(),
            scenarios = tests.len(),
            "encrypt manifest loaded"
        );

        Ok(Self {
            version,
            keys,
            plaintexts,
            tests,
        })
    }
}

/// Turn a `file://` keys reference into a path under `manifest_dir`.
fn resolve_keys_reference(manifest_dir: &Path, uri: &str) -> Result<PathBuf, ManifestError> {
    let relative = uri
        .strip_prefix(FILE_SCHEME)
        .map(Path::new)
        .ok_or_else(|| ManifestError::UnsupportedReferenceScheme(uri.to_owned()))?;
    if relative.is_absolute() {
        return Err(ManifestError::AbsoluteReference(uri.to_owned()));
    }
    Ok(manifest_dir.join(relative))
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    //! Documents shared by the manifest tests.

    use serde_json::{json, Value};

    pub fn keys_document() -> Value {
        json!({
            "manifest": {"type": "keys", "version": 3},
            "keys": {
                "aes-256": {
                    "encrypt": true, "decrypt": true, "type": "symmetric",
                    "algorithm": "aes", "bits": 256, "encoding": "base64",
                    "material": "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=",
                    "key-id": "aes-256"
                },
                "kms-b": {
                    "encrypt": true, "decrypt": true, "type": "aws-kms",
                    "key-id": "arn:aws:kms:us-west-2:111122223333:key/b"
                },
                "kms-c": {
                    "encrypt": true, "decrypt": true, "type": "aws-kms",
                    "key-id": "arn:aws:kms:us-west-2:111122223333:key/c"
                }
            }
        })
    }

    pub fn raw_aes_spec(key: &str) -> Value {
        json!({
            "type": "raw", "key": key,
            "provider-id": "aws-raw-vectors-persistant", "encryption-algorithm": "aes"
        })
    }

    pub fn kms_spec(key: &str) -> Value {
        json!({"type": "aws-kms", "key": key})
    }

    pub fn encrypt_manifest(plaintexts: Value, tests: Vec<Value>) -> Value {
        json!({
            "manifest": {"type": "awses-encrypt", "version": 1},
            "keys": "file://keys.json",
            "plaintexts": plaintexts,
            "tests": tests
        })
    }

    pub fn scenario(plaintext: &str, algorithm: &str, master_keys: Vec<Value>) -> Value {
        json!({
            "plaintext": plaintext,
            "algorithm": algorithm,
            "frame-size": 4096,
            "encryption-context": {"purpose": "test"},
            "master-keys": master_keys
        })
    }
}
