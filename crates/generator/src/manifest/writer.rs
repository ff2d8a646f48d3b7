//! Writing generated vectors and the `awses-decrypt` result manifest.
//!
//! # Output layout
//!
//! ```text
//! <target>/manifest.json          awses-decrypt manifest
//! <target>/keys.json              copy of the keys manifest
//! <target>/plaintexts/<name>      one file per generated plaintext
//! <target>/ciphertexts/<test>     one file per scenario, named by UUID
//! ```

use std::{
    collections::BTreeMap,
    io,
    path::{Component, Path, PathBuf},
};

use common::manifest::{
    ClientInfo, DecryptManifestDocument, DecryptTestDocument, ManifestHeader, DECRYPT_MANIFEST_TYPE,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::{EncryptManifest, ResolvedScenario};

/// Version of the result manifest this writer produces.
pub const DECRYPT_MANIFEST_VERSION: u64 = 1;

const MANIFEST_FILE: &str = "manifest.json";
const KEYS_FILE: &str = "keys.json";
const PLAINTEXTS_DIR: &str = "plaintexts";
const CIPHERTEXTS_DIR: &str = "ciphertexts";

/// Error type returned by a [`MessageEncryptor`].
pub type EncryptError = Box<dyn std::error::Error + Send + Sync>;

/// Performs the actual message encryption for a resolved scenario.
///
/// Implemented by the encryption library under test; the generator only
/// supplies inputs and persists the output.
#[cfg_attr(test, mockall::automock)]
pub trait MessageEncryptor {
    /// Identity recorded in the result manifest's `client` block.
    fn client(&self) -> ClientInfo;

    /// Encrypt `scenario.plaintext` under the scenario's provider, suite,
    /// frame size, and encryption context, returning the serialised message.
    fn encrypt(&self, scenario: &ResolvedScenario) -> Result<Vec<u8>, EncryptError>;
}

/// Errors produced while writing vectors.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialise {}: {source}", path.display())]
    Serialise {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A plaintext name cannot be used as a file name.
    #[error("plaintext name {0:?} is not a plain file name")]
    InvalidPlaintextName(String),

    /// The encryptor rejected a scenario.
    #[error("encryption failed for test {test}: {source}")]
    Encrypt {
        test: String,
        #[source]
        source: EncryptError,
    },
}

/// Encrypt every scenario of `manifest` and write the results under `target_dir`.
///
/// Scenarios are encrypted in manifest order; the first encryptor failure
/// aborts the write. Returns the result manifest that was written.
///
/// # Errors
///
/// Returns [`WriteError::InvalidPlaintextName`] before anything is written if
/// a plaintext name is not a plain file name, [`WriteError::Encrypt`] if the
/// encryptor fails, and [`WriteError::Io`] / [`WriteError::Serialise`] if an
/// output cannot be written.
pub fn write_to_dir(
    manifest: &EncryptManifest,
    target_dir: &Path,
    encryptor: &dyn MessageEncryptor,
) -> Result<DecryptManifestDocument, WriteError> {
    if let Some((name, _)) = manifest.plaintexts.iter().find(|(name, _)| !is_plain_file_name(name)) {
        return Err(WriteError::InvalidPlaintextName(name.to_owned()));
    }

    let plaintext_dir = target_dir.join(PLAINTEXTS_DIR);
    let ciphertext_dir = target_dir.join(CIPHERTEXTS_DIR);
    for dir in [target_dir, &plaintext_dir, &ciphertext_dir] {
        std::fs::create_dir_all(dir).map_err(io_error(dir))?;
    }

    write_json(&target_dir.join(KEYS_FILE), manifest.keys.document())?;

    for (name, bytes) in manifest.plaintexts.iter() {
        write_file(&plaintext_dir.join(name), bytes)?;
    }

    let mut tests = BTreeMap::new();
    for scenario in &manifest.tests {
        let test = Uuid::new_v4().to_string();
        let ciphertext = encryptor
            .encrypt(scenario)
            .map_err(|source| WriteError::Encrypt {
                test: test.clone(),
                source,
            })?;
        write_file(&ciphertext_dir.join(&test), &ciphertext)?;
        debug!(
            test = %test,
            algorithm = %scenario.algorithm.string_id(),
            plaintext = %scenario.plaintext_name,
            ciphertext_len = ciphertext.len(),
            "wrote ciphertext"
        );

        let master_keys = scenario
            .master_key_specs
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| WriteError::Serialise {
                path: target_dir.join(MANIFEST_FILE),
                source,
            })?;
        tests.insert(
            test.clone(),
            DecryptTestDocument {
                plaintext: format!("file://{PLAINTEXTS_DIR}/{}", scenario.plaintext_name),
                ciphertext: format!("file://{CIPHERTEXTS_DIR}/{test}"),
                master_keys,
            },
        );
    }

    let document = DecryptManifestDocument {
        manifest: ManifestHeader::new(DECRYPT_MANIFEST_TYPE, DECRYPT_MANIFEST_VERSION),
        client: encryptor.client(),
        keys: format!("file://{KEYS_FILE}"),
        tests,
    };
    write_json(&target_dir.join(MANIFEST_FILE), &document)?;

    info!(
        target = %target_dir.display(),
        tests = document.tests.len(),
        plaintexts = manifest.plaintexts.len(),
        "test vectors written"
    );
    Ok(document)
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> WriteError + '_ {
    move |source| WriteError::Io {
        path: path.to_owned(),
        source,
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), WriteError> {
    std::fs::write(path, contents).map_err(io_error(path))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), WriteError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| WriteError::Serialise {
        path: path.to_owned(),
        source,
    })?;
    write_file(path, text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::test_fixtures::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn loaded_manifest(dir: &TempDir) -> EncryptManifest {
        std::fs::write(dir.path().join("keys.json"), keys_document().to_string()).unwrap();
        let manifest = encrypt_manifest(
            json!({"small": 16, "empty": 0}),
            vec![
                scenario("small", "0178", vec![raw_aes_spec("aes-256"), kms_spec("kms-b")]),
                scenario("empty", "0014", vec![kms_spec("kms-c")]),
            ],
        );
        EncryptManifest::load(&manifest.to_string(), dir.path()).unwrap()
    }

    fn test_client() -> ClientInfo {
        ClientInfo {
            name: "test-client".into(),
            version: "0.0.1".into(),
        }
    }

    #[test]
    fn writes_layout_and_result_manifest() {
        let input = TempDir::new().unwrap();
        let manifest = loaded_manifest(&input);
        let out = TempDir::new().unwrap();

        let mut encryptor = MockMessageEncryptor::new();
        encryptor.expect_client().returning(test_client);
        encryptor
            .expect_encrypt()
            .times(2)
            .returning(|s| Ok([b"ct:".as_slice(), &s.plaintext[..]].concat()));

        let written = write_to_dir(&manifest, out.path(), &encryptor).unwrap();

        assert_eq!(written.manifest.type_name, "awses-decrypt");
        assert_eq!(written.client, test_client());
        assert_eq!(written.tests.len(), 2);

        for (name, test) in &written.tests {
            assert_eq!(test.ciphertext, format!("file://ciphertexts/{name}"));
            let ct = std::fs::read(out.path().join("ciphertexts").join(name)).unwrap();
            assert!(ct.starts_with(b"ct:"));
        }

        let small = std::fs::read(out.path().join("plaintexts/small")).unwrap();
        assert_eq!(small, manifest.plaintexts.get("small").unwrap().as_ref());
        assert!(std::fs::read(out.path().join("plaintexts/empty")).unwrap().is_empty());

        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.path().join("manifest.json")).unwrap()).unwrap();
        assert_eq!(on_disk["manifest"], json!({"type": "awses-decrypt", "version": 1}));
        assert_eq!(on_disk["keys"], "file://keys.json");

        let keys: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.path().join("keys.json")).unwrap()).unwrap();
        assert_eq!(keys, keys_document());
    }

    #[test]
    fn result_manifest_records_master_keys_in_order() {
        let input = TempDir::new().unwrap();
        let manifest = loaded_manifest(&input);
        let out = TempDir::new().unwrap();

        let mut encryptor = MockMessageEncryptor::new();
        encryptor.expect_client().returning(test_client);
        encryptor.expect_encrypt().returning(|_| Ok(vec![0u8; 4]));

        let written = write_to_dir(&manifest, out.path(), &encryptor).unwrap();
        let small = written
            .tests
            .values()
            .find(|t| t.plaintext == "file://plaintexts/small")
            .unwrap();
        assert_eq!(small.master_keys, vec![raw_aes_spec("aes-256"), kms_spec("kms-b")]);
    }

    #[test]
    fn encryptor_failure_aborts_write() {
        let input = TempDir::new().unwrap();
        let manifest = loaded_manifest(&input);
        let out = TempDir::new().unwrap();

        let mut encryptor = MockMessageEncryptor::new();
        encryptor.expect_client().returning(test_client);
        encryptor
            .expect_encrypt()
            .times(1)
            .returning(|_| Err("frame size out of range".into()));

        let err = write_to_dir(&manifest, out.path(), &encryptor).unwrap_err();
        assert!(matches!(err, WriteError::Encrypt { .. }));
        assert!(err.to_string().contains("frame size out of range"));
        assert!(!out.path().join("manifest.json").exists());
    }

    #[test]
    fn invalid_plaintext_name_writes_nothing() {
        let input = TempDir::new().unwrap();
        std::fs::write(input.path().join("keys.json"), keys_document().to_string()).unwrap();
        let document = encrypt_manifest(json!({"a": 4, "nested/b": 4}), vec![]);
        let manifest = EncryptManifest::load(&document.to_string(), input.path()).unwrap();

        let out = TempDir::new().unwrap();
        let target = out.path().join("vectors");
        let mut encryptor = MockMessageEncryptor::new();
        encryptor.expect_encrypt().never();
        encryptor.expect_client().never();

        let err = write_to_dir(&manifest, &target, &encryptor).unwrap_err();
        assert!(matches!(err, WriteError::InvalidPlaintextName(ref n) if n == "nested/b"));
        assert!(!target.exists());
    }

    #[test]
    fn plain_file_names() {
        assert!(is_plain_file_name("small"));
        assert!(is_plain_file_name("tiny.bin"));
        assert!(!is_plain_file_name("../escape"));
        assert!(!is_plain_file_name("nested/name"));
        assert!(!is_plain_file_name("/abs"));
        assert!(!is_plain_file_name(""));
    }
}
