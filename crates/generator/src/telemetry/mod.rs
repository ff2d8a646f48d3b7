//! Structured logging setup for the generator binary.
//!
//! # Telemetry invariants
//!
//! - **No key material or plaintext content** may appear in any log field.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`); `RUST_LOG`
//!   overrides it when set.

pub mod init;

pub use init::init;
