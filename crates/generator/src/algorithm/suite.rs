//! Static algorithm-suite table and string-id lookup.

use std::fmt;

use thiserror::Error;

/// Errors produced by the algorithm registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgorithmError {
    /// The identifier is not hex or names no registered suite.
    #[error("unknown algorithm suite: {0}")]
    UnknownSuite(String),
}

/// Key derivation applied to the data key before content encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kdf {
    Identity,
    HkdfSha256,
    HkdfSha384,
    HkdfSha512,
}

/// Message signature algorithm, if the suite signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    EcdsaP256,
    EcdsaP384,
}

/// Descriptor of one registered algorithm suite.
#[derive(Debug, PartialEq, Eq)]
pub struct AlgorithmSuite {
    pub id: u16,
    pub name: &'static str,
    pub data_key_bits: u32,
    pub kdf: Kdf,
    pub signature: Option<Signature>,
    /// Whether the suite commits to the data key.
    pub commits_key: bool,
}

const SUITES: &[AlgorithmSuite] = &[
    suite(0x0014, "AES_128_GCM_IV12_TAG16", 128, Kdf::Identity, None, false),
    suite(0x0046, "AES_192_GCM_IV12_TAG16", 192, Kdf::Identity, None, false),
    suite(0x0078, "AES_256_GCM_IV12_TAG16", 256, Kdf::Identity, None, false),
    suite(0x0114, "AES_128_GCM_IV12_TAG16_HKDF_SHA256", 128, Kdf::HkdfSha256, None, false),
    suite(0x0146, "AES_192_GCM_IV12_TAG16_HKDF_SHA256", 192, Kdf::HkdfSha256, None, false),
    suite(0x0178, "AES_256_GCM_IV12_TAG16_HKDF_SHA256", 256, Kdf::HkdfSha256, None, false),
    suite(
        0x0214,
        "AES_128_GCM_IV12_TAG16_HKDF_SHA256_ECDSA_P256",
        128,
        Kdf::HkdfSha256,
        Some(Signature::EcdsaP256),
        false,
    ),
    suite(
        0x0346,
        "AES_192_GCM_IV12_TAG16_HKDF_SHA384_ECDSA_P384",
        192,
        Kdf::HkdfSha384,
        Some(Signature::EcdsaP384),
        false,
    ),
    suite(
        0x0378,
        "AES_256_GCM_IV12_TAG16_HKDF_SHA384_ECDSA_P384",
        256,
        Kdf::HkdfSha384,
        Some(Signature::EcdsaP384),
        false,
    ),
    suite(0x0478, "AES_256_GCM_HKDF_SHA512_COMMIT_KEY", 256, Kdf::HkdfSha512, None, true),
    suite(
        0x0578,
        "AES_256_GCM_HKDF_SHA512_COMMIT_KEY_ECDSA_P384",
        256,
        Kdf::HkdfSha512,
        Some(Signature::EcdsaP384),
        true,
    ),
];

const fn suite(
    id: u16,
    name: &'static str,
    data_key_bits: u32,
    kdf: Kdf,
    signature: Option<Signature>,
    commits_key: bool,
) -> AlgorithmSuite {
    AlgorithmSuite {
        id,
        name,
        data_key_bits,
        kdf,
        signature,
        commits_key,
    }
}

impl AlgorithmSuite {
    /// All registered suites, in id order.
    pub fn all() -> &'static [AlgorithmSuite] {
        SUITES
    }

    /// Look up a suite by numeric id.
    pub fn by_id(id: u16) -> Option<&'static AlgorithmSuite> {
        SUITES.iter().find(|s| s.id == id)
    }

    /// Resolve a manifest algorithm identifier such as `"0178"` or `"0x0178"`.
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError::UnknownSuite`] if `id` is not hexadecimal or
    /// does not name a registered suite.
    pub fn from_string_id(id: &str) -> Result<&'static AlgorithmSuite, AlgorithmError> {
        let digits = id
            .strip_prefix("0x")
            .or_else(|| id.strip_prefix("0X"))
            .unwrap_or(id);
        u16::from_str_radix(digits, 16)
            .ok()
            .and_then(Self::by_id)
            .ok_or_else(|| AlgorithmError::UnknownSuite(id.to_owned()))
    }

    /// Canonical 4-digit upper-case hex id, as written in manifests.
    pub fn string_id(&self) -> String {
        format!("{:04X}", self.id)
    }

    pub fn data_key_len(&self) -> usize {
        (self.data_key_bits / 8) as usize
    }

    pub fn is_signing(&self) -> bool {
        self.signature.is_some()
    }
}

impl fmt::Display for AlgorithmSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.string_id())
    }
}
