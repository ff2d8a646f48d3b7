//! Decoding of key material from its manifest encoding.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::manifest::{KeyEncoding, KeyRecord, KeyType};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::store::KeysError;

/// PEM armour that every `pem`-encoded key must contain.
const PEM_BEGIN: &str = "-----BEGIN";

/// Decoded key material.
///
/// When this type is dropped, the buffer is overwritten with zeroes.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes(Vec<u8>);

impl SecretBytes {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretBytes([REDACTED])")
    }
}

/// Decode the material of the key record named `name`.
///
/// - `base64`: standard-alphabet base64. Symmetric keys must declare `bits`
///   matching the decoded length.
/// - `pem`: the PEM text itself, which must contain a `-----BEGIN` line.
///
/// # Errors
///
/// Returns [`KeysError::InvalidMaterial`] if material or encoding is absent, or
/// the material does not decode as declared.
pub fn decode_material(name: &str, record: &KeyRecord) -> Result<SecretBytes, KeysError> {
    let invalid = |reason: &str| KeysError::InvalidMaterial {
        key: name.to_owned(),
        reason: reason.to_owned(),
    };

    let text = record
        .material
        .as_ref()
        .ok_or_else(|| invalid("no material"))?
        .joined();
    let encoding = record.encoding.ok_or_else(|| invalid("no encoding"))?;

    let bytes = match encoding {
        KeyEncoding::Base64 => STANDARD
            .decode(text.trim())
            .map_err(|_| invalid("material is not valid base64"))?,
        KeyEncoding::Pem => {
            if !text.contains(PEM_BEGIN) {
                return Err(invalid("material is not PEM encoded"));
            }
            text.as_bytes().to_vec()
        }
    };

    if record.key_type == KeyType::Symmetric {
        let bits = record.bits.ok_or_else(|| invalid("symmetric key has no bit length"))?;
        if bytes.len() * 8 != bits as usize {
            return Err(KeysError::InvalidMaterial {
                key: name.to_owned(),
                reason: format!("expected {bits} bits, decoded {}", bytes.len() * 8),
            });
        }
    }

    Ok(SecretBytes(bytes))
}
