//! Root logger handle.

use crate::builder::build_tree;
use crate::node::LoggerNode;
use crate::registry::SinkRegistry;
use logtree_config::ValidatedLoggingConfig;
use logtree_domain::{Context, EXCEPTION_KEY, ErrorInfo, LogError, LogRecord, Message, Severity};
use logtree_ports::Environment;
use std::fmt;
use std::sync::Arc;

/// Root of a built logger tree.
///
/// The tree is read-only after construction, so a `Logger` can be shared
/// across threads. Every method returns `&Self` on success so calls chain.
pub struct Logger {
    root: LoggerNode,
    environment: Arc<dyn Environment>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Logger")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Build the tree for `config`.
    pub fn build(
        config: &ValidatedLoggingConfig,
        registry: &SinkRegistry,
        environment: Arc<dyn Environment>,
    ) -> Result<Self, LogError> {
        let root = build_tree(config, registry, Arc::clone(&environment))?;
        Ok(Self { root, environment })
    }

    /// Wrap an already built root node.
    #[must_use]
    pub fn from_root(root: LoggerNode, environment: Arc<dyn Environment>) -> Self {
        Self { root, environment }
    }

    /// Root node.
    #[must_use]
    pub const fn root(&self) -> &LoggerNode {
        &self.root
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Log `message` at `level`.
    ///
    /// `level` may be any string; unknown levels rank as debug. The reserved
    /// error keys in `context` are validated before any sink is touched.
    pub fn log(
        &self,
        level: &str,
        message: impl Into<Message>,
        context: Context,
    ) -> Result<&Self, LogError> {
        let record = LogRecord::new(level, message, context, self.environment.now())?;
        self.log_record(&record)
    }

    /// Dispatch a prepared record.
    pub fn log_record(&self, record: &LogRecord) -> Result<&Self, LogError> {
        if self.root.accepts(record.severity()) {
            self.root.dispatch(record)?;
        }
        Ok(self)
    }

    /// Capture `error` and its causes and log it at `error` under `exception`.
    #[track_caller]
    pub fn log_error<E>(&self, error: &E) -> Result<&Self, LogError>
    where
        E: std::error::Error + ?Sized,
    {
        let message = error.to_string();
        let info = ErrorInfo::capture(error);
        let context = Context::new().with_error(EXCEPTION_KEY, info);
        self.log(Severity::Error.as_str(), message, context)
    }

    /// Log at `debug`.
    pub fn debug(&self, message: impl Into<Message>, context: Context) -> Result<&Self, LogError> {
        self.log(Severity::Debug.as_str(), message, context)
    }

    /// Log at `info`.
    pub fn info(&self, message: impl Into<Message>, context: Context) -> Result<&Self, LogError> {
        self.log(Severity::Info.as_str(), message, context)
    }

    /// Log at `notice`.
    pub fn notice(&self, message: impl Into<Message>, context: Context) -> Result<&Self, LogError> {
        self.log(Severity::Notice.as_str(), message, context)
    }

    /// Log at `warning`.
    pub fn warning(
        &self,
        message: impl Into<Message>,
        context: Context,
    ) -> Result<&Self, LogError> {
        self.log(Severity::Warning.as_str(), message, context)
    }

    /// Log at `error`.
    pub fn error(&self, message: impl Into<Message>, context: Context) -> Result<&Self, LogError> {
        self.log(Severity::Error.as_str(), message, context)
    }

    /// Log at `critical`.
    pub fn critical(
        &self,
        message: impl Into<Message>,
        context: Context,
    ) -> Result<&Self, LogError> {
        self.log(Severity::Critical.as_str(), message, context)
    }

    /// Log at `alert`.
    pub fn alert(&self, message: impl Into<Message>, context: Context) -> Result<&Self, LogError> {
        self.log(Severity::Alert.as_str(), message, context)
    }

    /// Log at `emergency`.
    pub fn emergency(
        &self,
        message: impl Into<Message>,
        context: Context,
    ) -> Result<&Self, LogError> {
        self.log(Severity::Emergency.as_str(), message, context)
    }
}
