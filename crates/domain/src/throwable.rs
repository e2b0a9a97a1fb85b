//! Error capability carried in log context.
//!
//! Anything stored under a reserved error key must implement [`Throwable`].
//! [`ErrorInfo`] is the owned implementation used for captured Rust errors,
//! panics, and error objects supplied as JSON.

use serde::{Deserialize, Serialize};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::panic::Location;

/// Upper bound on rendered or captured cause-chain depth.
pub const MAX_CHAIN_DEPTH: usize = 32;

/// Source position an error was raised or observed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file path.
    pub file: String,
    /// 1-based line number.
    pub line: u32,
}

impl SourceLocation {
    /// Build a location.
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.file, self.line)
    }
}

/// Capability required from error values placed in log context.
pub trait Throwable: fmt::Debug + Send + Sync {
    /// Short type name of the error.
    fn type_name(&self) -> &str;

    /// Human-readable message.
    fn message(&self) -> &str;

    /// Where the error was raised, when known.
    fn location(&self) -> Option<&SourceLocation>;

    /// Stack trace text; may be empty.
    fn stack_trace(&self) -> &str;

    /// Wrapped cause, if any.
    fn previous(&self) -> Option<&dyn Throwable>;
}

/// Owned error description with an optional cause chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ErrorInfo {
    type_name: String,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<SourceLocation>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    stack_trace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous: Option<Box<ErrorInfo>>,
}

impl ErrorInfo {
    /// Describe an error by type name and message.
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            location: None,
            stack_trace: String::new(),
            previous: None,
        }
    }

    /// Attach a source location.
    #[must_use]
    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.location = Some(SourceLocation::new(file, line));
        self
    }

    /// Attach stack trace text.
    #[must_use]
    pub fn with_stack_trace(mut self, trace: impl Into<String>) -> Self {
        self.stack_trace = trace.into();
        self
    }

    /// Attach a cause.
    #[must_use]
    pub fn caused_by(mut self, previous: Self) -> Self {
        self.previous = Some(Box::new(previous));
        self
    }

    /// Capture a Rust error and its `source()` chain at the caller's location.
    ///
    /// The outermost entry carries the caller location and a backtrace when
    /// `RUST_BACKTRACE` enables capture; causes carry only type and message.
    #[track_caller]
    pub fn capture<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let location = SourceLocation::from(Location::caller());
        let trace = render_backtrace(&Backtrace::capture(), &location);

        let mut causes = Vec::new();
        let mut current = error.source();
        while let Some(cause) = current {
            if causes.len() + 1 >= MAX_CHAIN_DEPTH {
                break;
            }
            causes.push(Self::new("Error", cause.to_string()));
            current = cause.source();
        }

        let chained = causes
            .into_iter()
            .rev()
            .reduce(|inner, outer| outer.caused_by(inner));

        let mut info = Self::new(short_type_name::<E>(), error.to_string())
            .at(location.file, location.line)
            .with_stack_trace(trace);
        info.previous = chained.map(Box::new);
        info
    }

    /// Parse an error object from a JSON context value.
    ///
    /// Returns `None` when the value is not an object shaped like
    /// `{typeName, message, location?, stackTrace?, previous?}`.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

impl Throwable for ErrorInfo {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    fn stack_trace(&self) -> &str {
        &self.stack_trace
    }

    fn previous(&self) -> Option<&dyn Throwable> {
        self.previous
            .as_deref()
            .map(|previous| previous as &dyn Throwable)
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.type_name, self.message)
    }
}

/// Render a captured backtrace, falling back to a single frame at `location`.
pub fn render_backtrace(backtrace: &Backtrace, location: &SourceLocation) -> String {
    match backtrace.status() {
        BacktraceStatus::Captured => backtrace.to_string().trim_end().to_string(),
        _ => format!("#0 {location}"),
    }
}

fn short_type_name<E: ?Sized>() -> String {
    let full = std::any::type_name::<E>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl fmt::Display for Outer {
        fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("could not open journal")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn capture_records_type_location_and_causes() {
        let error = Outer(std::io::Error::other("disk full"));
        let info = ErrorInfo::capture(&error);

        assert_eq!(info.type_name(), "Outer");
        assert_eq!(info.message(), "could not open journal");
        assert!(
            info.location()
                .is_some_and(|location| location.file.ends_with("throwable.rs"))
        );
        assert!(!info.stack_trace().is_empty());

        let cause = info.previous();
        assert_eq!(cause.map(|cause| cause.message()), Some("disk full"));
        assert!(cause.and_then(|cause| cause.previous()).is_none());
    }

    #[test]
    fn from_json_accepts_error_objects_only() {
        let value = json!({
            "typeName": "RuntimeException",
            "message": "bad state",
            "location": {"file": "worker.rs", "line": 12},
            "previous": {"typeName": "IoError", "message": "eof"}
        });
        let info = ErrorInfo::from_json(&value);
        assert_eq!(
            info.as_ref().map(ErrorInfo::to_string),
            Some("RuntimeException: bad state".to_string())
        );
        assert_eq!(
            info.as_ref()
                .and_then(|info| info.previous())
                .map(|cause| cause.type_name()),
            Some("IoError")
        );

        assert!(ErrorInfo::from_json(&json!("just text")).is_none());
        assert!(ErrorInfo::from_json(&json!({"message": "no type"})).is_none());
        assert!(ErrorInfo::from_json(&json!({"typeName": "X", "message": "m", "extra": 1})).is_none());
    }

    #[test]
    fn short_type_name_strips_paths_and_generics() {
        assert_eq!(short_type_name::<std::io::Error>(), "Error");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
    }
}
