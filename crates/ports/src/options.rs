//! Typed access to sink-specific config options.

use logtree_domain::SinkError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Sink options keyed by their camelCase config name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SinkOptions {
    values: BTreeMap<String, Value>,
}

impl SinkOptions {
    /// Wrap a raw option map.
    #[must_use]
    pub const fn new(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    /// Builder-style insert, mostly for tests.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Raw value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Whether no options are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Optional string option; `null` counts as absent.
    pub fn string(&self, key: &str) -> Result<Option<String>, SinkError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(SinkError::invalid_option(key, "a string")),
        }
    }

    /// String option with a fallback.
    pub fn string_or(&self, key: &str, default: &str) -> Result<String, SinkError> {
        Ok(self.string(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// List of strings; a single string is accepted as a one-element list.
    pub fn string_list(&self, key: &str) -> Result<Vec<String>, SinkError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(value)) => Ok(vec![value.clone()]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| SinkError::invalid_option(key, "a list of strings"))
                })
                .collect(),
            Some(_) => Err(SinkError::invalid_option(key, "a list of strings")),
        }
    }

    /// Non-negative integer option with a fallback.
    pub fn usize_or(&self, key: &str, default: usize) -> Result<usize, SinkError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(value) => value
                .as_u64()
                .and_then(|value| usize::try_from(value).ok())
                .ok_or_else(|| SinkError::invalid_option(key, "a non-negative integer")),
        }
    }

    /// One of `choices` (case-insensitive), or `default` when unset.
    pub fn choice<'a>(
        &self,
        key: &str,
        choices: &[&'a str],
        default: &'a str,
    ) -> Result<&'a str, SinkError> {
        let Some(raw) = self.string(key)? else {
            return Ok(default);
        };
        choices
            .iter()
            .find(|choice| choice.eq_ignore_ascii_case(raw.trim()))
            .copied()
            .ok_or_else(|| SinkError::invalid_option(key, format!("one of {}", choices.join("|"))))
    }
}

impl From<BTreeMap<String, Value>> for SinkOptions {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self::new(values)
    }
}
