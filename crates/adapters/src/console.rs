//! Console sink: one line per record on stderr or stdout.

use crate::stream::{LineWriter, StdStream, stream_target};
use logtree_domain::{LogRecord, Severity, SinkError};
use logtree_ports::{Sink, SinkFactory, SinkSection, StreamTarget};
use std::sync::Arc;

/// Identifier of the console sink.
pub const CONSOLE_SINK_TYPE: &str = "console";

/// Default template: level, message, context block.
pub const CONSOLE_MESSAGE_FORMAT: &str = "%5$s %6$s%7$s";

const RESET: &str = "\x1b[m";

/// ANSI color prefix for a severity; `None` for uncolored output.
#[must_use]
pub const fn level_color(severity: Severity) -> Option<&'static str> {
    match severity {
        Severity::Debug => None,
        Severity::Info | Severity::Notice => Some("\x1b[32m"),
        Severity::Warning => Some("\x1b[33m"),
        Severity::Error | Severity::Critical | Severity::Alert => Some("\x1b[31m"),
        Severity::Emergency => Some("\x1b[37;41m"),
    }
}

/// When the console sink emits color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Ask the environment whether the stream supports color.
    Auto,
    /// Always color.
    Always,
    /// Never color.
    Never,
}

impl ColorMode {
    fn parse(raw: &str) -> Self {
        match raw {
            "always" => Self::Always,
            "never" => Self::Never,
            _ => Self::Auto,
        }
    }
}

/// Writes `formatted` plus a newline, optionally wrapped in a level color.
#[derive(Debug)]
pub struct ConsoleSink {
    writer: Arc<dyn LineWriter>,
    colored: bool,
}

impl ConsoleSink {
    /// Console sink over `writer`.
    #[must_use]
    pub fn new(writer: Arc<dyn LineWriter>, colored: bool) -> Self {
        Self { writer, colored }
    }

    fn render(&self, severity: Severity, formatted: &str) -> String {
        match level_color(severity).filter(|_| self.colored) {
            Some(color) => format!("{color}{formatted}{RESET}\n"),
            None => format!("{formatted}\n"),
        }
    }
}

impl Sink for ConsoleSink {
    fn write(&self, record: &LogRecord, formatted: &str) -> Result<(), SinkError> {
        let line = self.render(record.severity(), formatted);
        self.writer
            .write_line(&line)
            .map_err(|error| SinkError::io(self.writer.name(), error))
    }
}

/// Builds [`ConsoleSink`]s.
///
/// Options: `stream` (`stderr`|`stdout`, default `stderr`) and `color`
/// (`auto`|`always`|`never`, default `auto`).
#[derive(Debug, Default)]
pub struct ConsoleSinkFactory;

impl SinkFactory for ConsoleSinkFactory {
    fn sink_type(&self) -> &str {
        CONSOLE_SINK_TYPE
    }

    fn default_message_format(&self) -> Option<&str> {
        Some(CONSOLE_MESSAGE_FORMAT)
    }

    fn build(&self, section: &SinkSection) -> Result<Box<dyn Sink>, SinkError> {
        let stream = stream_target(section.options.choice(
            "stream",
            &[StreamTarget::Stderr.as_str(), StreamTarget::Stdout.as_str()],
            StreamTarget::Stderr.as_str(),
        )?);
        let mode = ColorMode::parse(section.options.choice(
            "color",
            &["auto", "always", "never"],
            "auto",
        )?);
        let colored = match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => section.environment.supports_color(stream),
        };
        Ok(Box::new(ConsoleSink::new(Arc::new(StdStream(stream)), colored)))
    }
}
