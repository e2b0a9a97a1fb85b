//! Structured context attached to a log record.

use crate::throwable::Throwable;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Reserved key for an exception-style error value.
pub const EXCEPTION_KEY: &str = "exception";
/// Reserved key for an error value.
pub const ERROR_KEY: &str = "error";
/// Reserved error keys in rendering order.
pub const RESERVED_ERROR_KEYS: [&str; 2] = [EXCEPTION_KEY, ERROR_KEY];

/// Whether `key` is one of the reserved error keys.
#[must_use]
pub fn is_reserved_error_key(key: &str) -> bool {
    RESERVED_ERROR_KEYS.contains(&key)
}

/// A single context entry.
#[derive(Debug, Clone)]
pub enum ContextValue {
    /// Plain structured data.
    Value(Value),
    /// An error satisfying the [`Throwable`] capability.
    Error(Arc<dyn Throwable>),
}

impl ContextValue {
    /// JSON form used when dumping the context block.
    ///
    /// Errors outside the reserved keys render as `"Type: message"`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Error(error) => Value::String(format!("{}: {}", error.type_name(), error.message())),
        }
    }

    /// Text substituted for a `{key}` placeholder.
    #[must_use]
    pub fn interpolation_text(&self) -> String {
        match self {
            Self::Value(Value::String(text)) => text.clone(),
            Self::Value(value) => value.to_string(),
            Self::Error(error) => error.message().to_string(),
        }
    }

    /// JSON type name for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Value(Value::Null) => "null",
            Self::Value(Value::Bool(_)) => "boolean",
            Self::Value(Value::Number(_)) => "number",
            Self::Value(Value::String(_)) => "string",
            Self::Value(Value::Array(_)) => "array",
            Self::Value(Value::Object(_)) => "object",
            Self::Error(_) => "error",
        }
    }
}

impl From<Value> for ContextValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Arc<dyn Throwable>> for ContextValue {
    fn from(error: Arc<dyn Throwable>) -> Self {
        Self::Error(error)
    }
}

/// Key/value context; iteration order is by key.
#[derive(Debug, Clone, Default)]
pub struct Context {
    entries: BTreeMap<String, ContextValue>,
}

impl Context {
    /// Empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a plain value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, ContextValue::Value(value.into()));
        self
    }

    /// Builder-style insert of an error value.
    #[must_use]
    pub fn with_error(mut self, key: impl Into<String>, error: impl Throwable + 'static) -> Self {
        self.insert(key, ContextValue::Error(Arc::new(error)));
        self
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: ContextValue) -> Option<ContextValue> {
        self.entries.insert(key.into(), value)
    }

    /// Remove an entry.
    pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
        self.entries.remove(key)
    }

    /// Look up an entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries.get(key)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// JSON object of every entry.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl From<Map<String, Value>> for Context {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            entries: map
                .into_iter()
                .map(|(key, value)| (key, ContextValue::Value(value)))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<ContextValue>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.to_json())
    }
}
