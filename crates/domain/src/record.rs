//! Immutable log records.

use crate::context::{Context, ContextValue, RESERVED_ERROR_KEYS};
use crate::error::LogError;
use crate::severity::Severity;
use crate::throwable::{ErrorInfo, Throwable};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;

/// Message payload of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Plain text, subject to `{key}` interpolation.
    Text(String),
    /// Structured value, pretty-printed and never interpolated.
    Structured(Value),
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for Message {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            other => Self::Structured(other),
        }
    }
}

/// One log call, validated once at the root of the tree.
#[derive(Debug, Clone)]
pub struct LogRecord {
    level: String,
    severity: Severity,
    message: Message,
    context: Context,
    timestamp: DateTime<Utc>,
}

impl LogRecord {
    /// Build a record, validating the reserved error keys.
    ///
    /// A reserved key holding a JSON object shaped like an error is promoted
    /// to an error value. Any other non-error value fails with
    /// [`LogError::InvalidContext`].
    pub fn new(
        level: impl Into<String>,
        message: impl Into<Message>,
        mut context: Context,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, LogError> {
        for key in RESERVED_ERROR_KEYS {
            let promoted = match context.get(key) {
                None | Some(ContextValue::Error(_)) => continue,
                Some(ContextValue::Value(value)) => ErrorInfo::from_json(value),
            };
            match promoted {
                Some(info) => {
                    context.insert(key, ContextValue::Error(Arc::new(info)));
                },
                None => {
                    let found = context.get(key).map_or("missing", ContextValue::kind);
                    return Err(LogError::InvalidContext {
                        key: key.to_string(),
                        found: found.to_string(),
                    });
                },
            }
        }

        let level = level.into();
        Ok(Self {
            severity: Severity::resolve(&level),
            level,
            message: message.into(),
            context,
            timestamp,
        })
    }

    /// Level string exactly as the caller supplied it.
    #[must_use]
    pub fn level(&self) -> &str {
        &self.level
    }

    /// Resolved severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Message payload.
    #[must_use]
    pub const fn message(&self) -> &Message {
        &self.message
    }

    /// Full context, reserved keys included.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Instant the record was created.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Error values under the reserved keys, in rendering order.
    pub fn errors(&self) -> impl Iterator<Item = (&'static str, &dyn Throwable)> + '_ {
        RESERVED_ERROR_KEYS
            .into_iter()
            .filter_map(|key| match self.context.get(key) {
                Some(ContextValue::Error(error)) => Some((key, error.as_ref())),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    #[test]
    fn record_keeps_raw_level_and_resolves_severity() -> Result<(), LogError> {
        let record = LogRecord::new("Warning", "disk low", Context::new(), now())?;
        assert_eq!(record.level(), "Warning");
        assert_eq!(record.severity(), Severity::Warning);

        let unknown = LogRecord::new("chatty", "x", Context::new(), now())?;
        assert_eq!(unknown.severity(), Severity::Debug);
        Ok(())
    }

    #[test]
    fn reserved_key_with_plain_value_is_rejected() {
        let context = Context::new().with("exception", "not an error");
        let error = LogRecord::new("error", "boom", context, now()).err();
        assert!(matches!(
            error,
            Some(LogError::InvalidContext { ref key, ref found })
                if key == "exception" && found == "string"
        ));
    }

    #[test]
    fn reserved_key_with_error_object_is_promoted() -> Result<(), LogError> {
        let context = Context::new().with(
            "error",
            json!({"typeName": "Timeout", "message": "upstream slow"}),
        );
        let record = LogRecord::new("error", "request failed", context, now())?;
        let errors: Vec<_> = record
            .errors()
            .map(|(key, error)| (key, error.type_name().to_string()))
            .collect();
        assert_eq!(errors, vec![("error", "Timeout".to_string())]);
        Ok(())
    }

    #[test]
    fn errors_are_listed_exception_first() -> Result<(), LogError> {
        let context = Context::new()
            .with_error("error", ErrorInfo::new("B", "second"))
            .with_error("exception", ErrorInfo::new("A", "first"));
        let record = LogRecord::new("error", "two", context, now())?;
        let keys: Vec<_> = record.errors().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["exception", "error"]);
        Ok(())
    }

    #[test]
    fn message_from_json_string_is_text() {
        assert_eq!(Message::from(json!("plain")), Message::Text("plain".into()));
        assert!(matches!(
            Message::from(json!({"a": 1})),
            Message::Structured(_)
        ));
    }
}
