//! Keys manifest loading, lookup, and key-material decoding.
//!
//! # Lifecycle
//!
//! 1. The encrypt manifest names a keys document through a `file://` URI.
//! 2. [`KeyStore::from_file`] reads it once, validates its header (`keys`,
//!    version 3) and indexes the records by name.
//! 3. Scenario resolution borrows the store read-only; master keys decode the
//!    material they need via [`decode_material`].
//!
//! # Security invariants
//!
//! - Decoded key material is never logged or included in error messages.
//! - [`SecretBytes`] zeroes its buffer on drop and redacts itself in `Debug`.

pub mod material;
pub mod store;

pub use material::{decode_material, SecretBytes};
pub use store::{KeyStore, KeysError};
