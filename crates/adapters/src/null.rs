//! Sink that discards everything.

use logtree_domain::{LogRecord, SinkError};
use logtree_ports::{Sink, SinkFactory, SinkSection};

/// Identifier of the null sink.
pub const NULL_SINK_TYPE: &str = "null";

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl Sink for NullSink {
    fn write(&self, _record: &LogRecord, _formatted: &str) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Builds [`NullSink`]s; accepts and ignores any options.
#[derive(Debug, Default)]
pub struct NullSinkFactory;

impl SinkFactory for NullSinkFactory {
    fn sink_type(&self) -> &str {
        NULL_SINK_TYPE
    }

    fn build(&self, _section: &SinkSection) -> Result<Box<dyn Sink>, SinkError> {
        Ok(Box::new(NullSink))
    }
}
