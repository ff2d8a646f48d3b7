//! Manifest document formats and errors shared across the test-vector generator crates.

pub mod error;
pub mod manifest;

pub use error::HeaderError;
pub use manifest::validate_manifest_type;
