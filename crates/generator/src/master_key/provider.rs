//! Concrete master keys and the primary/delegate provider chain.

use super::spec::PaddingHash;
use crate::keys::SecretBytes;

/// Provider id reported by every AWS KMS master key.
pub const KMS_PROVIDER_ID: &str = "aws-kms";

/// How a raw master key wraps data keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapping {
    AesGcm,
    Rsa(RsaPadding),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsaPadding {
    Pkcs1,
    OaepMgf1(PaddingHash),
}

/// A single master key resolved from a [`MasterKeySpec`](super::MasterKeySpec).
#[derive(Debug, Clone)]
pub enum MasterKey {
    Raw(RawMasterKey),
    AwsKms(KmsMasterKey),
}

/// Locally held wrapping key.
#[derive(Debug, Clone)]
pub struct RawMasterKey {
    pub provider_id: String,
    pub key_id: String,
    pub wrapping: Wrapping,
    material: SecretBytes,
}

impl RawMasterKey {
    pub fn new(provider_id: String, key_id: String, wrapping: Wrapping, material: SecretBytes) -> Self {
        Self {
            provider_id,
            key_id,
            wrapping,
            material,
        }
    }

    /// Decoded wrapping key: raw bytes for AES, PEM text for RSA.
    pub fn material(&self) -> &SecretBytes {
        &self.material
    }
}

/// Key held in AWS KMS, addressed by ARN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmsMasterKey {
    pub key_id: String,
}

impl MasterKey {
    pub fn provider_id(&self) -> &str {
        match self {
            MasterKey::Raw(raw) => &raw.provider_id,
            MasterKey::AwsKms(_) => KMS_PROVIDER_ID,
        }
    }

    pub fn key_id(&self) -> &str {
        match self {
            MasterKey::Raw(raw) => &raw.key_id,
            MasterKey::AwsKms(kms) => &kms.key_id,
        }
    }
}

/// A scenario's master-key provider: one primary key plus ordered delegates.
///
/// The primary generates the data key; each delegate additionally wraps it,
/// in the order it was added. A provider always holds at least its primary.
#[derive(Debug, Clone)]
pub struct MasterKeyProvider {
    primary: MasterKey,
    delegates: Vec<MasterKey>,
}

impl MasterKeyProvider {
    pub fn new(primary: MasterKey) -> Self {
        Self {
            primary,
            delegates: Vec::new(),
        }
    }

    /// Register `key` after every delegate added so far.
    pub fn add_delegate(&mut self, key: MasterKey) {
        self.delegates.push(key);
    }

    pub fn primary(&self) -> &MasterKey {
        &self.primary
    }

    pub fn delegates(&self) -> &[MasterKey] {
        &self.delegates
    }

    /// Every key in consultation order: the primary, then each delegate.
    pub fn members(&self) -> impl Iterator<Item = &MasterKey> {
        std::iter::once(&self.primary).chain(self.delegates.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kms(arn: &str) -> MasterKey {
        MasterKey::AwsKms(KmsMasterKey { key_id: arn.into() })
    }

    #[test]
    fn new_provider_has_no_delegates() {
        let provider = MasterKeyProvider::new(kms("a"));
        assert_eq!(provider.primary().key_id(), "a");
        assert!(provider.delegates().is_empty());
        assert_eq!(provider.members().count(), 1);
    }

    #[test]
    fn delegates_keep_registration_order() {
        let mut provider = MasterKeyProvider::new(kms("a"));
        provider.add_delegate(kms("c"));
        provider.add_delegate(kms("b"));
        let ids: Vec<_> = provider.members().map(MasterKey::key_id).collect();
        assert_eq!(ids, ["a", "c", "b"]);
    }

    #[test]
    fn kms_keys_report_kms_provider_id() {
        assert_eq!(kms("arn").provider_id(), KMS_PROVIDER_ID);
    }
}
