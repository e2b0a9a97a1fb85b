//! # logtree-domain
//!
//! Domain model for the logger tree.
//!
//! - **Severity** - `Severity`, `SeverityRange`, and the total `rank` function
//! - **Records** - `LogRecord`, `Message`
//! - **Context** - `Context`, `ContextValue`, reserved error keys
//! - **Throwable** - the error capability and `ErrorInfo`
//! - **Formats** - `MessageTemplate`, `TimeFormat`
//! - **Errors** - `LogError`, `SinkError`
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use logtree_shared::shared_crate_version;

pub mod context;
pub mod error;
pub mod record;
pub mod severity;
pub mod template;
pub mod throwable;
pub mod time_format;

pub use context::{
    Context, ContextValue, ERROR_KEY, EXCEPTION_KEY, RESERVED_ERROR_KEYS, is_reserved_error_key,
};
pub use error::{LogError, SinkError};
pub use record::{LogRecord, Message};
pub use severity::{Severity, SeverityRange, UnknownSeverity, rank};
pub use template::{DEFAULT_MESSAGE_FORMAT, FIELD_COUNT, MessageTemplate, TemplateError};
pub use throwable::{ErrorInfo, MAX_CHAIN_DEPTH, SourceLocation, Throwable, render_backtrace};
pub use time_format::{DEFAULT_TIME_FORMAT, TimeFormat, TimeFormatError, TimeZone};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_crate_compiles() {
        assert!(!domain_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
