//! # logtree-shared
//!
//! Error envelopes and redaction helpers used by every logtree crate.
//!
//! - [`ErrorEnvelope`] with namespaced [`ErrorCode`]s (`core`, `config`,
//!   `logger`, `sink`)
//! - Secret-key detection and redaction for structured payloads
//!
//! This crate has no workspace dependencies.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod errors;
pub mod redaction;

pub use errors::{
    CONFIG_NAMESPACE, CORE_NAMESPACE, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata,
    LOGGER_NAMESPACE, SINK_NAMESPACE, error_code_for_io,
};
pub use redaction::{REDACTED, is_secret_key, redact_if_secret, redact_json};

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
