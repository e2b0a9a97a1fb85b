//! In-memory sinks that record what they were handed.
//!
//! Every sink built from the same factory shares one [`Journal`], so a test
//! can assert on the cross-sink write order of a whole tree.

use logtree_domain::{LogRecord, Severity, SinkError};
use logtree_ports::{Sink, SinkFactory, SinkSection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One recorded write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// Sink label, the section's `label` option or its config path.
    pub label: String,
    /// Caller-supplied level string.
    pub level: String,
    /// Resolved severity.
    pub severity: Severity,
    /// Fully formatted text.
    pub formatted: String,
}

/// Shared, ordered log of writes.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl Journal {
    /// Append an entry.
    pub fn push(&self, entry: JournalEntry) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(entry);
        }
    }

    /// Snapshot of all entries in write order.
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Labels in write order.
    pub fn labels(&self) -> Vec<String> {
        self.entries().into_iter().map(|entry| entry.label).collect()
    }

    /// Formatted texts in write order.
    pub fn formatted(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .map(|entry| entry.formatted)
            .collect()
    }

    /// Formatted texts written by `label`.
    pub fn formatted_for(&self, label: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.label == label)
            .map(|entry| entry.formatted)
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.clear();
        }
    }

    fn record(&self, label: &str, record: &LogRecord, formatted: &str) {
        self.push(JournalEntry {
            label: label.to_string(),
            level: record.level().to_string(),
            severity: record.severity(),
            formatted: formatted.to_string(),
        });
    }
}

/// Sink that appends every write to a [`Journal`].
#[derive(Debug, Clone)]
pub struct RecordingSink {
    label: String,
    journal: Journal,
}

impl RecordingSink {
    /// Recording sink writing under `label`.
    pub fn new(label: impl Into<String>, journal: Journal) -> Self {
        Self {
            label: label.into(),
            journal,
        }
    }
}

impl Sink for RecordingSink {
    fn write(&self, record: &LogRecord, formatted: &str) -> Result<(), SinkError> {
        self.journal.record(&self.label, record, formatted);
        Ok(())
    }
}

/// Factory for [`RecordingSink`]s sharing one journal.
///
/// The sink label comes from the section's `label` option and falls back to
/// the section path.
#[derive(Debug)]
pub struct RecordingSinkFactory {
    sink_type: String,
    default_format: Option<String>,
    contract_version: u32,
    journal: Journal,
    built: AtomicUsize,
}

impl RecordingSinkFactory {
    /// Factory registered as `sink_type`.
    pub fn new(sink_type: impl Into<String>, journal: Journal) -> Self {
        Self {
            sink_type: sink_type.into(),
            default_format: None,
            contract_version: logtree_ports::SINK_CONTRACT_VERSION,
            journal,
            built: AtomicUsize::new(0),
        }
    }

    /// Declare a default message format.
    #[must_use]
    pub fn with_default_format(mut self, format: impl Into<String>) -> Self {
        self.default_format = Some(format.into());
        self
    }

    /// Declare a contract version other than the current one.
    #[must_use]
    pub fn with_contract_version(mut self, version: u32) -> Self {
        self.contract_version = version;
        self
    }

    /// Shared journal.
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    /// Number of sinks built so far.
    pub fn built(&self) -> usize {
        self.built.load(Ordering::SeqCst)
    }
}

impl SinkFactory for RecordingSinkFactory {
    fn sink_type(&self) -> &str {
        &self.sink_type
    }

    fn contract_version(&self) -> u32 {
        self.contract_version
    }

    fn default_message_format(&self) -> Option<&str> {
        self.default_format.as_deref()
    }

    fn build(&self, section: &SinkSection) -> Result<Box<dyn Sink>, SinkError> {
        let label = section.options.string_or("label", &section.path)?;
        self.built.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingSink::new(label, self.journal.clone())))
    }
}

/// Sink that records the attempt and then fails.
#[derive(Debug, Clone)]
pub struct FailingSink {
    label: String,
    journal: Journal,
}

impl FailingSink {
    /// Failing sink writing under `label`.
    pub fn new(label: impl Into<String>, journal: Journal) -> Self {
        Self {
            label: label.into(),
            journal,
        }
    }
}

impl Sink for FailingSink {
    fn write(&self, record: &LogRecord, formatted: &str) -> Result<(), SinkError> {
        self.journal.record(&self.label, record, formatted);
        Err(SinkError::Transport {
            transport: self.label.clone(),
            reason: "refused by test sink".to_string(),
        })
    }
}

/// Factory for [`FailingSink`]s, registered as `failing`.
#[derive(Debug, Clone, Default)]
pub struct FailingSinkFactory {
    journal: Journal,
}

impl FailingSinkFactory {
    /// Factory sharing `journal`.
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

impl SinkFactory for FailingSinkFactory {
    fn sink_type(&self) -> &str {
        "failing"
    }

    fn build(&self, section: &SinkSection) -> Result<Box<dyn Sink>, SinkError> {
        let label = section.options.string_or("label", &section.path)?;
        Ok(Box::new(FailingSink::new(label, self.journal.clone())))
    }
}
