//! Common error types shared across crates.

use thiserror::Error;

/// Failure to validate the `manifest` header block of a document.
///
/// Every manifest kind (encrypt, keys, decrypt) starts with
/// `{"manifest": {"type": ..., "version": ...}}`; a reader accepts exactly one
/// type tag and a fixed set of versions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// The `manifest` object, or its `type` / `version` member, is absent.
    #[error("invalid manifest: missing manifest metadata")]
    MissingMetadata,

    /// The document declares a different manifest kind.
    #[error("unsupported manifest type: expected \"{expected}\", found \"{found}\"")]
    UnsupportedType { expected: String, found: String },

    /// The document's version is not one this reader understands.
    #[error("unsupported {type_name} manifest version {found} (supported: {supported:?})")]
    UnsupportedVersion {
        type_name: String,
        found: String,
        supported: Vec<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_offending_type() {
        let e = HeaderError::UnsupportedType {
            expected: "awses-encrypt".into(),
            found: "awses-decrypt".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("awses-decrypt"));
        assert!(msg.contains("awses-encrypt"));
    }

    #[test]
    fn display_names_offending_version() {
        let e = HeaderError::UnsupportedVersion {
            type_name: "keys".into(),
            found: "7".into(),
            supported: vec![3],
        };
        assert!(e.to_string().contains("version 7"));
    }
}
