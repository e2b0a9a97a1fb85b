//! Error envelope types and helpers.
//!
//! Every crate reports failures as an [`ErrorEnvelope`]: a kind, a stable
//! `namespace:code` pair, a message, and string metadata. Codes live in a
//! small set of namespaces so callers can branch on them without parsing
//! messages.

use crate::redaction::redact_if_secret;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, io};

/// Metadata attached to errors for diagnostics.
pub type ErrorMetadata = BTreeMap<String, String>;

/// Generic failures not tied to a logging concept.
pub const CORE_NAMESPACE: &str = "core";
/// Config documents, overrides, and environment variables.
pub const CONFIG_NAMESPACE: &str = "config";
/// Tree construction and dispatch.
pub const LOGGER_NAMESPACE: &str = "logger";
/// Individual sink implementations.
pub const SINK_NAMESPACE: &str = "sink";

/// High-level classification of error origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Bad configuration or caller input.
    Expected,
    /// Broken engine assumptions.
    Invariant,
    /// I/O and transport failures.
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Expected => "expected",
            Self::Invariant => "invariant",
            Self::Unexpected => "unexpected",
        })
    }
}

/// Stable error code with namespace and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode {
    namespace: String,
    code: String,
}

impl ErrorCode {
    /// Create a code in an arbitrary namespace.
    pub fn new(namespace: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            code: code.into(),
        }
    }

    /// Code in the `config` namespace.
    pub fn config(code: impl Into<String>) -> Self {
        Self::new(CONFIG_NAMESPACE, code)
    }

    /// Code in the `logger` namespace.
    pub fn logger(code: impl Into<String>) -> Self {
        Self::new(LOGGER_NAMESPACE, code)
    }

    /// Code in the `sink` namespace.
    pub fn sink(code: impl Into<String>) -> Self {
        Self::new(SINK_NAMESPACE, code)
    }

    /// Malformed caller input.
    pub fn invalid_input() -> Self {
        Self::new(CORE_NAMESPACE, "invalid_input")
    }

    /// Missing file or resource.
    pub fn not_found() -> Self {
        Self::new(CORE_NAMESPACE, "not_found")
    }

    /// Access refused by the OS.
    pub fn permission_denied() -> Self {
        Self::new(CORE_NAMESPACE, "permission_denied")
    }

    /// Other I/O failure.
    pub fn io() -> Self {
        Self::new(CORE_NAMESPACE, "io")
    }

    /// Engine failure with no better code.
    pub fn internal() -> Self {
        Self::new(CORE_NAMESPACE, "internal")
    }

    /// Returns the namespace portion.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the code identifier.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// True for codes produced by failed file or stream access.
    #[must_use]
    pub fn is_io(&self) -> bool {
        self.namespace == CORE_NAMESPACE
            && matches!(
                self.code.as_str(),
                "io" | "not_found" | "permission_denied"
            )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.namespace, self.code)
    }
}

/// Structured error envelope shared across crates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Error kind describing the origin category.
    pub kind: ErrorKind,
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Additional diagnostic metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: ErrorMetadata,
}

impl ErrorEnvelope {
    fn with_kind(kind: ErrorKind, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Create an expected error.
    pub fn expected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Expected, code, message)
    }

    /// Create an invariant error.
    pub fn invariant(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Invariant, code, message)
    }

    /// Create an unexpected error.
    pub fn unexpected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Unexpected, code, message)
    }

    /// Shorthand for an unexpected `core:internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::unexpected(ErrorCode::internal(), message)
    }

    /// Attach a single metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach the config path (`children[1].children[0]`, a file path) the error refers to.
    #[must_use]
    pub fn at_path(self, path: impl Into<String>) -> Self {
        self.with_metadata("path", path)
    }

    /// True when the caller can fix the failure by changing input.
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        matches!(self.kind, ErrorKind::Expected)
    }

    /// Copy with secret-looking metadata values (passwords, tokens) replaced.
    #[must_use]
    pub fn redacted(mut self) -> Self {
        for (key, value) in &mut self.metadata {
            *value = redact_if_secret(key, value);
        }
        self
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {}: {}", self.kind, self.code, self.message)
    }
}

impl std::error::Error for ErrorEnvelope {}

impl From<io::Error> for ErrorEnvelope {
    fn from(error: io::Error) -> Self {
        Self::unexpected(error_code_for_io(&error), error.to_string())
    }
}

/// Map the first I/O error in a source chain onto a stable error code.
///
/// Errors without an I/O cause map to `core:internal`.
pub fn error_code_for_io(error: &(dyn std::error::Error + 'static)) -> ErrorCode {
    let mut current = Some(error);
    while let Some(candidate) = current {
        if let Some(io_error) = candidate.downcast_ref::<io::Error>() {
            return match io_error.kind() {
                io::ErrorKind::NotFound => ErrorCode::not_found(),
                io::ErrorKind::PermissionDenied => ErrorCode::permission_denied(),
                _ => ErrorCode::io(),
            };
        }
        current = candidate.source();
    }
    ErrorCode::internal()
}
