//! [`PlaintextStore`]: randomly generated plaintexts, keyed by manifest name.

use std::collections::BTreeMap;

use bytes::Bytes;
use common::manifest::PlaintextSpecs;
use rand::{rngs::OsRng, RngCore};
use tracing::debug;

use super::ManifestError;

/// Plaintexts generated once per manifest load and shared by every scenario.
///
/// Contents are random and carry no meaning; only each buffer's length and
/// identity matter to the vectors produced from it. [`Bytes`] clones share the
/// underlying buffer, so scenarios hold the same bytes the store does.
#[derive(Debug, Clone, Default)]
pub struct PlaintextStore {
    inner: BTreeMap<String, Bytes>,
}

impl PlaintextStore {
    /// Generate one buffer of exactly the requested size for every spec entry.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::DuplicatePlaintext`] if a name appears twice,
    /// and [`ManifestError::PlaintextTooLarge`] if a size does not fit in memory.
    pub fn generate(specs: &PlaintextSpecs) -> Result<Self, ManifestError> {
        let mut inner = BTreeMap::new();
        for (name, size) in specs.iter() {
            if inner.contains_key(name) {
                return Err(ManifestError::DuplicatePlaintext(name.to_owned()));
            }
            let bytes = random_bytes(size).ok_or_else(|| ManifestError::PlaintextTooLarge {
                name: name.to_owned(),
                size,
            })?;
            inner.insert(name.to_owned(), bytes);
            debug!(plaintext = name, size, "generated plaintext");
        }
        Ok(Self { inner })
    }

    /// Borrow the plaintext named `name`.
    pub fn get(&self, name: &str) -> Option<&Bytes> {
        self.inner.get(name)
    }

    /// Iterate plaintexts in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bytes)> {
        self.inner.iter().map(|(name, bytes)| (name.as_str(), bytes))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Fill a fresh buffer from the OS CSPRNG, or `None` if `size` cannot be allocated.
fn random_bytes(size: u64) -> Option<Bytes> {
    let len = usize::try_from(size).ok()?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).ok()?;
    buf.resize(len, 0);
    OsRng.fill_bytes(&mut buf);
    Some(Bytes::from(buf))
}
