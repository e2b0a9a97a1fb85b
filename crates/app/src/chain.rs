//! Error chain rendering.
//!
//! Each error in a chain renders as one block:
//!
//! ```text
//!
//! Type: message in file:line
//!
//! Stack trace:
//!
//! trace
//! ```
//!
//! Blocks are joined by a `---` line. Rendering stops after
//! [`MAX_CHAIN_DEPTH`] blocks so a self-referential chain still terminates.

use logtree_domain::{ContextValue, LogError, MAX_CHAIN_DEPTH, Throwable};

/// Line separating one block from its cause.
pub const CHAIN_SEPARATOR: &str = "---";

/// Marker appended when a chain is cut at the depth limit.
pub const TRUNCATION_MARKER: &str = "... (cause chain truncated)";

/// Render `error` and its causes, outermost first.
#[must_use]
pub fn render_chain(error: &dyn Throwable) -> String {
    let mut output = String::new();
    let mut current = Some(error);
    let mut depth = 0usize;

    while let Some(entry) = current {
        if depth == MAX_CHAIN_DEPTH {
            push_line(&mut output, CHAIN_SEPARATOR);
            push_line(&mut output, TRUNCATION_MARKER);
            break;
        }
        if depth > 0 {
            push_line(&mut output, CHAIN_SEPARATOR);
        }
        render_block(&mut output, entry);
        depth += 1;
        current = entry.previous();
    }

    output
}

/// Render the value stored under reserved error key `key`.
///
/// Fails with [`LogError::InvalidContext`] when the value is plain data.
pub fn render_context_error(key: &str, value: &ContextValue) -> Result<String, LogError> {
    match value {
        ContextValue::Error(error) => Ok(render_chain(error.as_ref())),
        ContextValue::Value(_) => Err(LogError::InvalidContext {
            key: key.to_string(),
            found: value.kind().to_string(),
        }),
    }
}

fn render_block(output: &mut String, error: &dyn Throwable) {
    output.push('\n');
    output.push_str(error.type_name());
    output.push_str(": ");
    output.push_str(error.message());
    if let Some(location) = error.location() {
        output.push_str(" in ");
        output.push_str(&location.to_string());
    }
    output.push_str("\n\nStack trace:\n\n");
    output.push_str(error.stack_trace());
    output.push('\n');
}

fn push_line(output: &mut String, line: &str) {
    output.push_str(line);
    output.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtree_domain::{ErrorInfo, SourceLocation};
    use serde_json::json;

    #[test]
    fn single_error_renders_one_block() {
        let error = ErrorInfo::new("IoError", "disk full")
            .at("src/store.rs", 42)
            .with_stack_trace("#0 src/store.rs:42");

        assert_eq!(
            render_chain(&error),
            "\nIoError: disk full in src/store.rs:42\n\nStack trace:\n\n#0 src/store.rs:42\n"
        );
    }

    #[test]
    fn cause_follows_separator_exactly_once() {
        let error = ErrorInfo::new("RequestError", "upload failed")
            .at("src/api.rs", 7)
            .caused_by(ErrorInfo::new("IoError", "broken pipe").at("src/net.rs", 99));

        let rendered = render_chain(&error);
        assert_eq!(rendered.matches("RequestError: upload failed").count(), 1);
        assert_eq!(rendered.matches("IoError: broken pipe in src/net.rs:99").count(), 1);
        assert_eq!(rendered.matches("\n---\n").count(), 1);

        let outer = rendered.find("RequestError").unwrap_or(usize::MAX);
        let separator = rendered.find("---").unwrap_or(usize::MAX);
        let inner = rendered.find("IoError").unwrap_or(0);
        assert!(outer < separator && separator < inner);
    }

    #[test]
    fn missing_location_is_omitted() {
        let rendered = render_chain(&ErrorInfo::new("Error", "plain"));
        assert!(rendered.starts_with("\nError: plain\n\nStack trace:"));
    }

    #[derive(Debug)]
    struct Looping {
        location: SourceLocation,
    }

    impl Throwable for Looping {
        fn type_name(&self) -> &str {
            "Looping"
        }

        fn message(&self) -> &str {
            "again"
        }

        fn location(&self) -> Option<&SourceLocation> {
            Some(&self.location)
        }

        fn stack_trace(&self) -> &str {
            ""
        }

        fn previous(&self) -> Option<&dyn Throwable> {
            Some(self as &dyn Throwable)
        }
    }

    #[test]
    fn self_referential_chain_is_truncated() {
        let error = Looping {
            location: SourceLocation::new("loop.rs", 1),
        };
        let rendered = render_chain(&error);
        assert_eq!(rendered.matches("Looping: again").count(), MAX_CHAIN_DEPTH);
        assert!(rendered.ends_with(&format!("{TRUNCATION_MARKER}\n")));
    }

    #[test]
    fn plain_value_under_reserved_key_is_rejected() {
        let result = render_context_error("error", &ContextValue::Value(json!("oops")));
        assert!(matches!(
            result,
            Err(LogError::InvalidContext { ref key, ref found }) if key == "error" && found == "string"
        ));
    }
}
