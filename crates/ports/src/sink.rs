//! Sink boundary contract.

use crate::environment::Environment;
use crate::options::SinkOptions;
use logtree_domain::{LogRecord, SinkError};
use std::fmt;
use std::sync::Arc;

/// Version of the sink contract implemented by this crate.
///
/// Factories declaring a different version are rejected at tree build time.
pub const SINK_CONTRACT_VERSION: u32 = 1;

/// Terminal component that performs the I/O for a formatted record.
///
/// `write` receives the record (level, context, timestamp) alongside the
/// fully formatted message. Failures are returned, never raised; the owning
/// node decides whether they are reported or propagated.
pub trait Sink: Send + Sync + fmt::Debug {
    /// Perform the side effect for one record.
    fn write(&self, record: &LogRecord, formatted: &str) -> Result<(), SinkError>;
}

/// Construction input handed to a [`SinkFactory`].
#[derive(Clone)]
pub struct SinkSection {
    /// Config path of the section, for diagnostics.
    pub path: String,
    /// Sink-specific options from the section.
    pub options: SinkOptions,
    /// Process environment collaborator.
    pub environment: Arc<dyn Environment>,
}

impl fmt::Debug for SinkSection {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SinkSection")
            .field("path", &self.path)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Registry entry that builds sinks of one type from config sections.
pub trait SinkFactory: Send + Sync {
    /// Identifier used in configuration (`sink`/`logger` key).
    fn sink_type(&self) -> &str;

    /// Contract version this factory was written against.
    fn contract_version(&self) -> u32 {
        SINK_CONTRACT_VERSION
    }

    /// Message template used when a section does not set `messageFormat`.
    fn default_message_format(&self) -> Option<&str> {
        None
    }

    /// Build a sink; must not perform I/O.
    fn build(&self, section: &SinkSection) -> Result<Box<dyn Sink>, SinkError>;
}
