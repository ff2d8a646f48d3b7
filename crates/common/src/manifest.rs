//! JSON document formats read and written by the generator.
//!
//! Three manifest kinds share the same header block:
//!
//! ```text
//! {"manifest": {"type": "<kind>", "version": <n>}, ...}
//! ```
//!
//! - `awses-encrypt`: the input describing which vectors to generate.
//! - `keys`: named key records referenced by the other two.
//! - `awses-decrypt`: the result manifest written next to the ciphertexts.

use std::{borrow::Cow, collections::BTreeMap, fmt};

use serde::{
    de::{MapAccess, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::Value;

use crate::error::HeaderError;

/// Type tag of the encrypt manifest.
pub const ENCRYPT_MANIFEST_TYPE: &str = "awses-encrypt";
/// Type tag of the result manifest written after encryption.
pub const DECRYPT_MANIFEST_TYPE: &str = "awses-decrypt";
/// Type tag of the keys manifest.
pub const KEYS_MANIFEST_TYPE: &str = "keys";

/// Check the `manifest.type` / `manifest.version` header of a raw document.
///
/// Returns the declared version on success.
///
/// # Errors
///
/// - [`HeaderError::MissingMetadata`] if the header block is absent or `type`
///   is not a string.
/// - [`HeaderError::UnsupportedType`] if `type` differs from `type_name`.
/// - [`HeaderError::UnsupportedVersion`] if `version` is not one of
///   `supported_versions`.
pub fn validate_manifest_type(
    raw: &Value,
    type_name: &str,
    supported_versions: &[u64],
) -> Result<u64, HeaderError> {
    let header = raw.get("manifest").ok_or(HeaderError::MissingMetadata)?;
    let found_type = header
        .get("type")
        .and_then(Value::as_str)
        .ok_or(HeaderError::MissingMetadata)?;
    let found_version = header.get("version").ok_or(HeaderError::MissingMetadata)?;

    if found_type != type_name {
        return Err(HeaderError::UnsupportedType {
            expected: type_name.to_owned(),
            found: found_type.to_owned(),
        });
    }

    match found_version.as_u64() {
        Some(v) if supported_versions.contains(&v) => Ok(v),
        _ => Err(HeaderError::UnsupportedVersion {
            type_name: type_name.to_owned(),
            found: found_version.to_string(),
            supported: supported_versions.to_vec(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// The `manifest` block at the top of every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestHeader {
    #[serde(rename = "type")]
    pub type_name: String,
    pub version: u64,
}

impl ManifestHeader {
    pub fn new(type_name: impl Into<String>, version: u64) -> Self {
        Self {
            type_name: type_name.into(),
            version,
        }
    }
}

// ---------------------------------------------------------------------------
// Encrypt manifest
// ---------------------------------------------------------------------------

/// Input manifest listing the encrypt scenarios to generate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptManifestDocument {
    pub manifest: ManifestHeader,
    /// URI of the keys manifest, relative to this document.
    pub keys: String,
    /// Plaintext name → size in bytes.
    pub plaintexts: PlaintextSpecs,
    /// Scenarios, in output order.
    pub tests: Vec<ScenarioDocument>,
}

/// One raw entry of the encrypt manifest's `tests` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScenarioDocument {
    /// Name of an entry in `plaintexts`.
    pub plaintext: String,
    /// Hex algorithm suite id, e.g. `"0178"`.
    pub algorithm: String,
    /// Passed through as written; range checks belong to the encryptor.
    pub frame_size: i64,
    pub encryption_context: BTreeMap<String, String>,
    /// Master key specs, left as raw JSON for the master-key layer to interpret.
    pub master_keys: Vec<Value>,
}

/// Ordered `name → size` mapping from the `plaintexts` object.
///
/// Entries keep document order, and repeated names are retained rather than
/// collapsed so the loader can reject them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaintextSpecs(Vec<(String, u64)>);

impl PlaintextSpecs {
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, size)| (name.as_str(), *size))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, u64)> for PlaintextSpecs {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for PlaintextSpecs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, size)| (name, size)))
    }
}

impl<'de> Deserialize<'de> for PlaintextSpecs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SpecsVisitor;

        impl<'de> Visitor<'de> for SpecsVisitor {
            type Value = PlaintextSpecs;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of plaintext name to size in bytes")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, u64>()? {
                    entries.push(entry);
                }
                Ok(PlaintextSpecs(entries))
            }
        }

        deserializer.deserialize_map(SpecsVisitor)
    }
}

// ---------------------------------------------------------------------------
// Keys manifest
// ---------------------------------------------------------------------------

/// The keys manifest: named key records shared by encrypt and decrypt manifests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysDocument {
    pub manifest: ManifestHeader,
    pub keys: BTreeMap<String, KeyRecord>,
}

/// A single named key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KeyRecord {
    /// Whether the key may be used to produce ciphertexts.
    pub encrypt: bool,
    /// Whether the key may be used to decrypt ciphertexts.
    pub decrypt: bool,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<KeyAlgorithm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<KeyEncoding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<KeyMaterialText>,
    /// Identifier recorded in ciphertext headers (raw keys) or the KMS key ARN.
    pub key_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyType {
    Symmetric,
    Private,
    Public,
    AwsKms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAlgorithm {
    Aes,
    Rsa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEncoding {
    Base64,
    Pem,
}

/// Encoded key material: either one string or a list of lines (PEM).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyMaterialText {
    Text(String),
    Lines(Vec<String>),
}

impl KeyMaterialText {
    /// The material as a single string; list form is joined with newlines.
    pub fn joined(&self) -> Cow<'_, str> {
        match self {
            KeyMaterialText::Text(s) => Cow::Borrowed(s),
            KeyMaterialText::Lines(lines) => Cow::Owned(lines.join("\n")),
        }
    }
}

impl fmt::Debug for KeyMaterialText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterialText([REDACTED])")
    }
}

// ---------------------------------------------------------------------------
// Decrypt (result) manifest
// ---------------------------------------------------------------------------

/// Result manifest pairing each ciphertext with its plaintext and keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptManifestDocument {
    pub manifest: ManifestHeader,
    pub client: ClientInfo,
    /// URI of the keys manifest, relative to this document.
    pub keys: String,
    /// Test name → expected decrypt inputs.
    pub tests: BTreeMap<String, DecryptTestDocument>,
}

/// Name and version of the implementation that produced the ciphertexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DecryptTestDocument {
    pub plaintext: String,
    pub ciphertext: String,
    pub master_keys: Vec<Value>,
}
