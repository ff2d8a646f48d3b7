//! [`KeyStore`]: read-only index of named key records.

use std::{
    io,
    path::{Path, PathBuf},
};

use common::{
    manifest::{KeyRecord, KeysDocument, KEYS_MANIFEST_TYPE},
    validate_manifest_type, HeaderError,
};
use thiserror::Error;
use tracing::debug;

/// Keys manifest versions this reader understands.
pub const SUPPORTED_VERSIONS: &[u64] = &[3];

/// Errors produced by the keys layer.
#[derive(Debug, Error)]
pub enum KeysError {
    /// The keys document could not be read.
    #[error("failed to read keys manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The keys document is not valid JSON or does not have the expected shape.
    #[error("malformed keys manifest: {0}")]
    Parse(#[source] serde_json::Error),

    /// The keys document declares the wrong type or an unsupported version.
    #[error(transparent)]
    UnsupportedManifest(#[from] HeaderError),

    /// No key with the requested name exists.
    #[error("unknown key: {0}")]
    UnknownKey(String),

    /// The key's encoded material is missing or does not decode.
    #[error("invalid material for key {key}: {reason}")]
    InvalidMaterial { key: String, reason: String },
}

/// Named key records loaded from a keys manifest.
///
/// Immutable once loaded; shared by reference across every scenario.
#[derive(Debug, Clone)]
pub struct KeyStore {
    document: KeysDocument,
}

impl KeyStore {
    /// Read and parse the keys manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`KeysError::Io`] if the file cannot be read, otherwise any
    /// error from [`KeyStore::from_document`].
    pub fn from_file(path: &Path) -> Result<Self, KeysError> {
        let text = std::fs::read_to_string(path).map_err(|source| KeysError::Io {
            path: path.to_owned(),
            source,
        })?;
        let store = Self::from_document(&text)?;
        debug!(path = %path.display(), keys = store.len(), "loaded keys manifest");
        Ok(store)
    }

    /// Parse a keys manifest from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`KeysError::Parse`] on malformed JSON or an unexpected shape, and
    /// [`KeysError::UnsupportedManifest`] if the header is not `keys` version 3.
    pub fn from_document(text: &str) -> Result<Self, KeysError> {
        let raw: serde_json::Value = serde_json::from_str(text).map_err(KeysError::Parse)?;
        validate_manifest_type(&raw, KEYS_MANIFEST_TYPE, SUPPORTED_VERSIONS)?;
        let document: KeysDocument = serde_json::from_value(raw).map_err(KeysError::Parse)?;
        Ok(Self { document })
    }

    /// Look up a key record by name.
    ///
    /// # Errors
    ///
    /// Returns [`KeysError::UnknownKey`] if `name` is not present.
    pub fn lookup(&self, name: &str) -> Result<&KeyRecord, KeysError> {
        self.document
            .keys
            .get(name)
            .ok_or_else(|| KeysError::UnknownKey(name.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.document.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.keys.is_empty()
    }

    /// The parsed document, for re-serialisation alongside generated vectors.
    pub fn document(&self) -> &KeysDocument {
        &self.document
    }
}
