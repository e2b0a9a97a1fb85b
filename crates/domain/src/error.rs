//! Error taxonomy for tree construction and dispatch.

use logtree_shared::{ErrorCode, ErrorEnvelope, error_code_for_io};
use std::io;

/// Failure reported by a concrete sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Underlying write failed.
    #[error("i/o failure writing to {target}: {source}")]
    Io {
        /// File path, stream name, or other destination.
        target: String,
        /// Source error.
        #[source]
        source: io::Error,
    },
    /// An external transport rejected or failed the delivery.
    #[error("{transport} transport failed: {reason}")]
    Transport {
        /// Transport name.
        transport: String,
        /// Failure detail.
        reason: String,
    },
    /// A sink option is missing or malformed.
    #[error("invalid option \"{key}\": expected {expected}")]
    InvalidOption {
        /// Option key.
        key: String,
        /// Description of the accepted values.
        expected: String,
    },
}

impl SinkError {
    /// Wrap an I/O error with its destination.
    pub fn io(target: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            target: target.into(),
            source,
        }
    }

    /// Build an invalid-option error.
    pub fn invalid_option(key: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidOption {
            key: key.into(),
            expected: expected.into(),
        }
    }
}

impl From<SinkError> for ErrorEnvelope {
    fn from(error: SinkError) -> Self {
        match &error {
            SinkError::Io { target, .. } => {
                let target = target.clone();
                Self::unexpected(error_code_for_io(&error), error.to_string())
                    .with_metadata("target", target)
            },
            SinkError::Transport { transport, .. } => {
                let transport = transport.clone();
                Self::unexpected(ErrorCode::sink("transport"), error.to_string())
                    .with_metadata("transport", transport)
            },
            SinkError::InvalidOption { key, .. } => {
                let key = key.clone();
                Self::expected(ErrorCode::sink("invalid_option"), error.to_string())
                    .with_metadata("option", key)
            },
        }
    }
}

/// Errors surfaced by tree construction and `log()` calls.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Configuration names a sink type nothing is registered for.
    #[error("sink type \"{sink_type}\" is not registered (at {path})")]
    UnknownSinkType {
        /// Requested identifier.
        sink_type: String,
        /// Config path of the offending section.
        path: String,
    },
    /// A registered implementation does not satisfy the sink contract.
    #[error("sink type \"{sink_type}\" violates the sink contract at {path}: {reason}")]
    ContractViolation {
        /// Resolved identifier.
        sink_type: String,
        /// Config path of the offending section.
        path: String,
        /// Why the implementation was rejected.
        reason: String,
    },
    /// A reserved error key holds something that is not an error.
    #[error("value of \"{key}\" key in log context is not an error value (found {found})")]
    InvalidContext {
        /// Reserved key.
        key: String,
        /// Kind of value found.
        found: String,
    },
    /// A sink failed and its node propagates failures.
    #[error("sink \"{sink_type}\" failed: {source}")]
    SinkFailure {
        /// Sink identifier.
        sink_type: String,
        /// Source error.
        #[source]
        source: SinkError,
    },
    /// Node configuration the engine cannot use.
    #[error("invalid logger configuration at {path}: {reason}")]
    InvalidConfig {
        /// Config path of the offending section.
        path: String,
        /// Failure detail.
        reason: String,
    },
}

impl LogError {
    /// Stable error code for this failure.
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnknownSinkType { .. } => ErrorCode::logger("unknown_sink_type"),
            Self::ContractViolation { .. } => ErrorCode::logger("contract_violation"),
            Self::InvalidContext { .. } => ErrorCode::logger("invalid_context"),
            Self::SinkFailure { .. } => ErrorCode::logger("sink_failure"),
            Self::InvalidConfig { .. } => ErrorCode::logger("invalid_config"),
        }
    }
}

impl From<LogError> for ErrorEnvelope {
    fn from(error: LogError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        match error {
            LogError::UnknownSinkType { sink_type, path } => Self::expected(code, message)
                .with_metadata("sinkType", sink_type)
                .at_path(path),
            LogError::ContractViolation {
                sink_type, path, ..
            } => Self::expected(code, message)
                .with_metadata("sinkType", sink_type)
                .at_path(path),
            LogError::InvalidContext { key, found } => Self::expected(code, message)
                .with_metadata("key", key)
                .with_metadata("found", found),
            LogError::SinkFailure { sink_type, source } => {
                let inner = Self::from(source);
                Self::unexpected(code, message)
                    .with_metadata("sinkType", sink_type)
                    .with_metadata("cause", inner.code.to_string())
            },
            LogError::InvalidConfig { path, .. } => {
                Self::expected(code, message).at_path(path)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtree_shared::ErrorKind;

    #[test]
    fn unknown_sink_type_maps_to_expected_envelope() {
        let envelope = ErrorEnvelope::from(LogError::UnknownSinkType {
            sink_type: "carrier-pigeon".into(),
            path: "children[0]".into(),
        });
        assert_eq!(envelope.kind, ErrorKind::Expected);
        assert_eq!(envelope.code, ErrorCode::logger("unknown_sink_type"));
        assert_eq!(
            envelope.metadata.get("sinkType").map(String::as_str),
            Some("carrier-pigeon")
        );
    }

    #[test]
    fn sink_failure_keeps_io_classification() {
        let failure = LogError::SinkFailure {
            sink_type: "file".into(),
            source: SinkError::io(
                "/var/log/app.log",
                io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            ),
        };
        assert!(failure.to_string().contains("/var/log/app.log"));

        let envelope = ErrorEnvelope::from(failure);
        assert_eq!(envelope.kind, ErrorKind::Unexpected);
        assert_eq!(
            envelope.metadata.get("cause").map(String::as_str),
            Some("core:permission_denied")
        );
    }

    #[test]
    fn invalid_context_message_names_key() {
        let error = LogError::InvalidContext {
            key: "exception".into(),
            found: "string".into(),
        };
        assert_eq!(
            error.to_string(),
            "value of \"exception\" key in log context is not an error value (found string)"
        );
    }
}
