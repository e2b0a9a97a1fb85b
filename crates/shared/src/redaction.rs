//! Secret detection and redaction utilities.
//!
//! Log context is free-form, so sinks that emit machine-readable payloads
//! run it through [`redact_json`] before it leaves the process.

use serde_json::Value;

/// The redacted placeholder string.
pub const REDACTED: &str = "[REDACTED]";

/// Checks if a key name likely refers to a secret.
///
/// # Examples
///
/// ```
/// use logtree_shared::is_secret_key;
///
/// assert!(is_secret_key("api_key"));
/// assert!(is_secret_key("sessionToken"));
/// assert!(!is_secret_key("userId"));
/// ```
pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_uppercase();
    key.contains("KEY")
        || key.contains("TOKEN")
        || key.contains("SECRET")
        || key.contains("PASSWORD")
        || key.contains("CREDENTIAL")
        || key.contains("AUTH")
}

/// Redacts a value if the key is likely a secret.
pub fn redact_if_secret(key: &str, value: &str) -> String {
    if is_secret_key(key) {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}

/// Recursively replaces object fields with secret-looking keys.
///
/// Arrays are walked element-wise; scalars are returned unchanged.
#[must_use]
pub fn redact_json(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    if is_secret_key(&key) {
                        (key, Value::String(REDACTED.to_string()))
                    } else {
                        (key, redact_json(value))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(redact_json).collect()),
        other => other,
    }
}
