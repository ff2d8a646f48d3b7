//! [`MasterKeySpec`]: the closed set of master-key kinds a manifest may declare.

use common::manifest::{KeyAlgorithm, KeyType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::provider::{KmsMasterKey, MasterKey, RawMasterKey, RsaPadding, Wrapping};
use crate::keys::{decode_material, KeyStore, KeysError};

/// Errors produced while turning a master-key spec into a master key.
#[derive(Debug, Error)]
pub enum MasterKeyError {
    /// The scenario's `master-keys` list is empty.
    #[error("scenario declares no master keys")]
    Empty,

    /// The spec is malformed or names an unsupported combination of options.
    #[error("invalid master key spec: {0}")]
    InvalidSpec(String),

    /// The referenced key is missing or its material is unusable.
    #[error(transparent)]
    Keys(#[from] KeysError),

    /// The referenced key is not marked for encryption.
    #[error("key {0} is not enabled for encryption")]
    NotEncryptable(String),

    /// The referenced key's type does not fit the spec.
    #[error("key {key} cannot back this master key: {reason}")]
    IncompatibleKey { key: String, reason: &'static str },
}

/// One entry of a scenario's `master-keys` list.
///
/// ```json
/// {"type": "raw", "key": "aes-256", "provider-id": "aws-raw-vectors-persistant",
///  "encryption-algorithm": "aes"}
/// {"type": "aws-kms", "key": "us-west-2-decryptable"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MasterKeySpec {
    Raw(RawKeySpec),
    AwsKms(KmsKeySpec),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawKeySpec {
    pub key: String,
    pub provider_id: String,
    pub encryption_algorithm: KeyAlgorithm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_algorithm: Option<PaddingAlgorithm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_hash: Option<PaddingHash>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KmsKeySpec {
    pub key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaddingAlgorithm {
    Pkcs1,
    OaepMgf1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddingHash {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl MasterKeySpec {
    /// Parse and validate one raw `master-keys` entry.
    ///
    /// # Errors
    ///
    /// Returns [`MasterKeyError::InvalidSpec`] if the entry has an unknown
    /// `type`, is missing fields, or combines wrapping and padding options
    /// that do not go together.
    pub fn from_scenario_spec(raw: &serde_json::Value) -> Result<Self, MasterKeyError> {
        let spec: MasterKeySpec = serde_json::from_value(raw.clone())
            .map_err(|e| MasterKeyError::InvalidSpec(e.to_string()))?;
        if let MasterKeySpec::Raw(raw) = &spec {
            raw.wrapping()?;
        }
        Ok(spec)
    }

    /// Name of the key record this spec refers to.
    pub fn key_name(&self) -> &str {
        match self {
            MasterKeySpec::Raw(raw) => &raw.key,
            MasterKeySpec::AwsKms(kms) => &kms.key,
        }
    }

    /// Resolve this spec to a concrete master key using `keys` for lookups.
    ///
    /// # Errors
    ///
    /// - [`MasterKeyError::Keys`] if the key is unknown or its material is invalid.
    /// - [`MasterKeyError::NotEncryptable`] if the key is not marked `encrypt`.
    /// - [`MasterKeyError::IncompatibleKey`] if the key type does not fit.
    pub fn master_key(&self, keys: &KeyStore) -> Result<MasterKey, MasterKeyError> {
        let name = self.key_name();
        let record = keys.lookup(name)?;
        if !record.encrypt {
            return Err(MasterKeyError::NotEncryptable(name.to_owned()));
        }
        let incompatible = |reason: &'static str| MasterKeyError::IncompatibleKey {
            key: name.to_owned(),
            reason,
        };

        match self {
            MasterKeySpec::AwsKms(_) => {
                if record.key_type != KeyType::AwsKms {
                    return Err(incompatible("aws-kms master keys need an aws-kms key"));
                }
                Ok(MasterKey::AwsKms(KmsMasterKey {
                    key_id: record.key_id.clone(),
                }))
            }
            MasterKeySpec::Raw(raw) => {
                let wrapping = raw.wrapping()?;
                match (wrapping, record.key_type) {
                    (Wrapping::AesGcm, KeyType::Symmetric) => {}
                    (Wrapping::Rsa(_), KeyType::Private | KeyType::Public) => {}
                    (Wrapping::AesGcm, _) => {
                        return Err(incompatible("aes wrapping needs a symmetric key"))
                    }
                    (Wrapping::Rsa(_), _) => {
                        return Err(incompatible("rsa wrapping needs a private or public key"))
                    }
                }
                if record.algorithm != Some(raw.encryption_algorithm) {
                    return Err(incompatible("key algorithm differs from encryption-algorithm"));
                }
                let material = decode_material(name, record)?;
                Ok(MasterKey::Raw(RawMasterKey::new(
                    raw.provider_id.clone(),
                    record.key_id.clone(),
                    wrapping,
                    material,
                )))
            }
        }
    }
}

impl RawKeySpec {
    /// The wrapping scheme this spec asks for, validated.
    fn wrapping(&self) -> Result<Wrapping, MasterKeyError> {
        let invalid = |msg: &str| -> Result<Wrapping, MasterKeyError> {
            Err(MasterKeyError::InvalidSpec(msg.to_owned()))
        };

        match (self.encryption_algorithm, self.padding_algorithm, self.padding_hash) {
            (KeyAlgorithm::Aes, None, None) => Ok(Wrapping::AesGcm),
            (KeyAlgorithm::Aes, _, _) => invalid("aes wrapping takes no padding options"),
            (KeyAlgorithm::Rsa, None, _) => invalid("rsa wrapping requires padding-algorithm"),
            (KeyAlgorithm::Rsa, Some(PaddingAlgorithm::Pkcs1), None) => {
                Ok(Wrapping::Rsa(RsaPadding::Pkcs1))
            }
            (KeyAlgorithm::Rsa, Some(PaddingAlgorithm::Pkcs1), Some(_)) => {
                invalid("pkcs1 padding takes no padding-hash")
            }
            (KeyAlgorithm::Rsa, Some(PaddingAlgorithm::OaepMgf1), Some(hash)) => {
                Ok(Wrapping::Rsa(RsaPadding::OaepMgf1(hash)))
            }
            (KeyAlgorithm::Rsa, Some(PaddingAlgorithm::OaepMgf1), None) => {
                invalid("oaep-mgf1 padding requires padding-hash")
            }
        }
    }
}
