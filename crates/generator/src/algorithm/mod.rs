//! Registry of AWS Encryption SDK algorithm suites.
//!
//! This module has no key or manifest dependencies.
//! Suites are identified in manifests by their 16-bit id written as hex:
//!
//! ```text
//! "0178"  →  AES_256_GCM_IV12_TAG16_HKDF_SHA256
//! ```

pub mod suite;

pub use suite::{AlgorithmError, AlgorithmSuite};
