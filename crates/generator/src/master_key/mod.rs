//! Master-key specs and the providers they resolve to.
//!
//! Each entry of a scenario's `master-keys` list is one [`MasterKeySpec`].
//! Resolving a spec against the [`KeyStore`](crate::keys::KeyStore) yields a
//! [`MasterKey`]; a scenario's keys are then composed into a single
//! [`MasterKeyProvider`] whose first key is the primary and whose remaining
//! keys are delegates, in declaration order.

pub mod provider;
pub mod spec;

pub use provider::{
    KmsMasterKey, MasterKey, MasterKeyProvider, RawMasterKey, RsaPadding, Wrapping,
};
pub use spec::{
    KmsKeySpec, MasterKeyError, MasterKeySpec, PaddingAlgorithm, PaddingHash, RawKeySpec,
};
