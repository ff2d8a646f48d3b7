//! Resolution of one raw scenario into a [`ResolvedScenario`].

use std::collections::BTreeMap;

use bytes::Bytes;
use common::manifest::ScenarioDocument;
use thiserror::Error;

use super::plaintext::PlaintextStore;
use crate::algorithm::{AlgorithmError, AlgorithmSuite};
use crate::keys::KeyStore;
use crate::master_key::{MasterKeyError, MasterKeyProvider, MasterKeySpec};

/// Errors produced while resolving a single scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The scenario names a plaintext the manifest does not declare.
    #[error("unknown plaintext: {0}")]
    UnknownPlaintext(String),

    #[error(transparent)]
    UnknownAlgorithmSuite(#[from] AlgorithmError),

    /// The master-key list is empty or one of its entries does not resolve.
    #[error(transparent)]
    MasterKey(#[from] MasterKeyError),
}

/// A scenario with every reference replaced by a concrete value.
#[derive(Debug, Clone)]
pub struct ResolvedScenario {
    pub plaintext_name: String,
    /// Shares the buffer held by the [`PlaintextStore`].
    pub plaintext: Bytes,
    pub algorithm: &'static AlgorithmSuite,
    /// Passed through as declared; range checks belong to the encryptor.
    pub frame_size: i64,
    pub encryption_context: BTreeMap<String, String>,
    /// The parsed specs, in declaration order, for the result manifest.
    pub master_key_specs: Vec<MasterKeySpec>,
    pub master_key_provider: MasterKeyProvider,
}

impl ResolvedScenario {
    /// Resolve `raw` against the shared key and plaintext stores.
    ///
    /// The first master key becomes the provider's primary; every later key is
    /// added to it as a delegate in declaration order.
    ///
    /// # Errors
    ///
    /// - [`ScenarioError::UnknownPlaintext`] if the plaintext name is absent.
    /// - [`ScenarioError::UnknownAlgorithmSuite`] if the algorithm id is unknown.
    /// - [`ScenarioError::MasterKey`] if `master-keys` is empty or any entry
    ///   fails to resolve.
    pub fn resolve(
        raw: &ScenarioDocument,
        keys: &KeyStore,
        plaintexts: &PlaintextStore,
    ) -> Result<Self, ScenarioError> {
        let plaintext = plaintexts
            .get(&raw.plaintext)
            .cloned()
            .ok_or_else(|| ScenarioError::UnknownPlaintext(raw.plaintext.clone()))?;

        let algorithm = AlgorithmSuite::from_string_id(&raw.algorithm)?;

        let master_key_specs = raw
            .master_keys
            .iter()
            .map(MasterKeySpec::from_scenario_spec)
            .collect::<Result<Vec<_>, _>>()?;

        let mut master_keys = master_key_specs.iter().map(|spec| spec.master_key(keys));
        let primary = master_keys.next().ok_or(MasterKeyError::Empty)??;
        let mut master_key_provider = MasterKeyProvider::new(primary);
        for key in master_keys {
            master_key_provider.add_delegate(key?);
        }

        Ok(Self {
            plaintext_name: raw.plaintext.clone(),
            plaintext,
            algorithm,
            frame_size: raw.frame_size,
            encryption_context: raw.encryption_context.clone(),
            master_key_specs,
            master_key_provider,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeysError;
    use crate::manifest::test_fixtures::{keys_document, kms_spec, raw_aes_spec};
    use crate::master_key::MasterKey;
    use common::manifest::PlaintextSpecs;
    use serde_json::{json, Value};

    fn stores() -> (KeyStore, PlaintextStore) {
        let keys = KeyStore::from_document(&keys_document().to_string()).unwrap();
        let specs: PlaintextSpecs = [("small".to_string(), 16), ("empty".to_string(), 0)]
            .into_iter()
            .collect();
        (keys, PlaintextStore::generate(&specs).unwrap())
    }

    fn scenario(plaintext: &str, algorithm: &str, master_keys: Vec<Value>) -> ScenarioDocument {
        serde_json::from_value(json!({
            "plaintext": plaintext,
            "algorithm": algorithm,
            "frame-size": 4096,
            "encryption-context": {"purpose": "test"},
            "master-keys": master_keys
        }))
        .unwrap()
    }

    fn key_ids(provider: &MasterKeyProvider) -> Vec<&str> {
        provider.members().map(MasterKey::key_id).collect()
    }

    #[test]
    fn single_key_scenario_resolves() {
        let (keys, plaintexts) = stores();
        let resolved =
            ResolvedScenario::resolve(&scenario("small", "0178", vec![raw_aes_spec("aes-256")]), &keys, &plaintexts)
                .unwrap();
        assert_eq!(resolved.plaintext.len(), 16);
        assert_eq!(resolved.plaintext, plaintexts.get("small").unwrap());
        assert_eq!(resolved.algorithm.id, 0x0178);
        assert_eq!(resolved.frame_size, 4096);
        assert_eq!(resolved.encryption_context.get("purpose").map(String::as_str), Some("test"));
        assert_eq!(resolved.master_key_provider.primary().key_id(), "aes-256");
        assert!(resolved.master_key_provider.delegates().is_empty());
    }

    #[test]
    fn first_key_is_primary_and_rest_are_delegates_in_order() {
        let (keys, plaintexts) = stores();
        let abc = scenario(
            "small",
            "0014",
            vec![raw_aes_spec("aes-256"), kms_spec("kms-b"), kms_spec("kms-c")],
        );
        let resolved = ResolvedScenario::resolve(&abc, &keys, &plaintexts).unwrap();
        assert_eq!(resolved.master_key_provider.primary().key_id(), "aes-256");
        assert_eq!(
            key_ids(&resolved.master_key_provider),
            ["aes-256", "arn:aws:kms:us-west-2:111122223333:key/b", "arn:aws:kms:us-west-2:111122223333:key/c"]
        );

        let acb = scenario(
            "small",
            "0014",
            vec![raw_aes_spec("aes-256"), kms_spec("kms-c"), kms_spec("kms-b")],
        );
        let resolved = ResolvedScenario::resolve(&acb, &keys, &plaintexts).unwrap();
        assert_eq!(
            key_ids(&resolved.master_key_provider),
            ["aes-256", "arn:aws:kms:us-west-2:111122223333:key/c", "arn:aws:kms:us-west-2:111122223333:key/b"]
        );
    }

    #[test]
    fn zero_length_plaintext_is_usable() {
        let (keys, plaintexts) = stores();
        let resolved =
            ResolvedScenario::resolve(&scenario("empty", "0078", vec![kms_spec("kms-b")]), &keys, &plaintexts)
                .unwrap();
        assert!(resolved.plaintext.is_empty());
    }

    #[test]
    fn unknown_plaintext_fails() {
        let (keys, plaintexts) = stores();
        let err = ResolvedScenario::resolve(&scenario("huge", "0178", vec![kms_spec("kms-b")]), &keys, &plaintexts)
            .unwrap_err();
        assert!(matches!(err, ScenarioError::UnknownPlaintext(ref n) if n == "huge"));
    }

    #[test]
    fn unknown_algorithm_fails() {
        let (keys, plaintexts) = stores();
        let err = ResolvedScenario::resolve(
            &scenario("small", "not-a-real-suite", vec![kms_spec("kms-b")]),
            &keys,
            &plaintexts,
        )
        .unwrap_err();
        assert!(matches!(err, ScenarioError::UnknownAlgorithmSuite(_)));
    }

    #[test]
    fn empty_master_keys_fails() {
        let (keys, plaintexts) = stores();
        let err = ResolvedScenario::resolve(&scenario("small", "0178", vec![]), &keys, &plaintexts).unwrap_err();
        assert!(matches!(err, ScenarioError::MasterKey(MasterKeyError::Empty)));
    }

    #[test]
    fn unresolvable_delegate_fails_whole_scenario() {
        let (keys, plaintexts) = stores();
        let err = ResolvedScenario::resolve(
            &scenario("small", "0178", vec![kms_spec("kms-b"), kms_spec("no-such-key")]),
            &keys,
            &plaintexts,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::MasterKey(MasterKeyError::Keys(KeysError::UnknownKey(ref k))) if k == "no-such-key"
        ));
    }

    #[test]
    fn specs_are_kept_in_declaration_order() {
        let (keys, plaintexts) = stores();
        let resolved = ResolvedScenario::resolve(
            &scenario("small", "0178", vec![kms_spec("kms-c"), raw_aes_spec("aes-256")]),
            &keys,
            &plaintexts,
        )
        .unwrap();
        let names: Vec<_> = resolved.master_key_specs.iter().map(MasterKeySpec::key_name).collect();
        assert_eq!(names, ["kms-c", "aes-256"]);
    }
}
