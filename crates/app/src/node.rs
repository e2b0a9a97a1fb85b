//! Logger tree nodes and dispatch.

use crate::formatter::MessageFormatter;
use logtree_config::SinkFailurePolicy;
use logtree_domain::{LogError, LogRecord, Severity, SeverityRange};
use logtree_ports::Sink;

/// Sink owned by a node, with the formatter that feeds it.
#[derive(Debug)]
pub struct NodeSink {
    sink_type: String,
    sink: Box<dyn Sink>,
    formatter: MessageFormatter,
    on_failure: SinkFailurePolicy,
}

impl NodeSink {
    /// Pair a sink with its formatter and failure policy.
    #[must_use]
    pub fn new(
        sink_type: impl Into<String>,
        sink: Box<dyn Sink>,
        formatter: MessageFormatter,
        on_failure: SinkFailurePolicy,
    ) -> Self {
        Self {
            sink_type: sink_type.into(),
            sink,
            formatter,
            on_failure,
        }
    }

    /// Sink identifier.
    #[must_use]
    pub fn sink_type(&self) -> &str {
        &self.sink_type
    }

    /// Formatter feeding the sink.
    #[must_use]
    pub const fn formatter(&self) -> &MessageFormatter {
        &self.formatter
    }

    fn write(&self, record: &LogRecord, path: &str) -> Result<(), LogError> {
        let formatted = self.formatter.format(record)?;
        match self.sink.write(record, &formatted) {
            Ok(()) => Ok(()),
            Err(source) => match self.on_failure {
                SinkFailurePolicy::Report => {
                    tracing::warn!(
                        target: "logtree::sink",
                        sink_type = %self.sink_type,
                        path = %path,
                        error = %source,
                        "sink write failed"
                    );
                    Ok(())
                },
                SinkFailurePolicy::Propagate => Err(LogError::SinkFailure {
                    sink_type: self.sink_type.clone(),
                    source,
                }),
            },
        }
    }
}

/// One node of the logger tree.
///
/// A node writes to its own sink first, then offers the record to each
/// child in declared order. A child receives the record only when its own
/// range accepts the record's severity; ranges are not inherited.
#[derive(Debug)]
pub struct LoggerNode {
    path: String,
    range: SeverityRange,
    sink: Option<NodeSink>,
    children: Vec<LoggerNode>,
}

impl LoggerNode {
    /// Node with no sink and no children.
    #[must_use]
    pub fn aggregate(path: impl Into<String>, range: SeverityRange) -> Self {
        Self {
            path: path.into(),
            range,
            sink: None,
            children: Vec::new(),
        }
    }

    /// Attach a sink.
    #[must_use]
    pub fn with_sink(mut self, sink: NodeSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Config path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Accepted severities.
    #[must_use]
    pub const fn range(&self) -> SeverityRange {
        self.range
    }

    /// Whether this node accepts `severity`.
    #[must_use]
    pub fn accepts(&self, severity: Severity) -> bool {
        self.range.accepts(severity)
    }

    /// Sink identifier, `None` for aggregates.
    #[must_use]
    pub fn sink_type(&self) -> Option<&str> {
        self.sink.as_ref().map(NodeSink::sink_type)
    }

    /// Own sink, if any.
    #[must_use]
    pub const fn sink(&self) -> Option<&NodeSink> {
        self.sink.as_ref()
    }

    /// Children in declared order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Nodes in this subtree, this one included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Write `record` to this node's sink and fan out to accepting children.
    ///
    /// The caller is responsible for checking this node's own range. The
    /// first error aborts the remaining fan-out at this node.
    pub fn dispatch(&self, record: &LogRecord) -> Result<(), LogError> {
        if let Some(sink) = self.sink.as_ref() {
            sink.write(record, &self.path)?;
        }

        let severity = record.severity();
        for child in &self.children {
            if child.accepts(severity) {
                child.dispatch(record)?;
            }
        }
        Ok(())
    }
}
