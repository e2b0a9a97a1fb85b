//! # logtree-adapters
//!
//! Concrete sinks (console, file, mail, JSON lines, null) and the host
//! process [`Environment`](logtree_ports::Environment).
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod console;
pub mod environment;
pub mod file;
pub mod json_lines;
pub mod mail;
pub mod null;
pub mod stream;

pub use console::{CONSOLE_SINK_TYPE, ColorMode, ConsoleSink, ConsoleSinkFactory};
pub use environment::ProcessEnvironment;
pub use file::{FILE_SINK_TYPE, FileSink, FileSinkFactory};
pub use json_lines::{JSON_SINK_TYPE, JsonLinesSink, JsonLinesSinkFactory};
pub use mail::{MAIL_SINK_TYPE, MailMessage, MailSink, MailSinkFactory, MailTransport, SendmailTransport};
pub use null::{NULL_SINK_TYPE, NullSink, NullSinkFactory};
pub use stream::{LineWriter, StdStream};

use logtree_ports::SinkFactory;
use std::sync::Arc;

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Factories for every sink this crate ships, in a stable order.
#[must_use]
pub fn builtin_factories() -> Vec<Arc<dyn SinkFactory>> {
    vec![
        Arc::new(ConsoleSinkFactory),
        Arc::new(FileSinkFactory),
        Arc::new(JsonLinesSinkFactory),
        Arc::new(MailSinkFactory::default()),
        Arc::new(NullSinkFactory),
    ]
}
