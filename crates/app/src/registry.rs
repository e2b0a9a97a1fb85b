//! Sink-type registry.
//!
//! Maps sink identifiers to factories. Identifiers are matched
//! case-insensitively. [`AGGREGATE_SINK_TYPE`] is always resolvable and
//! names a node that only fans out to its children.

use logtree_config::AGGREGATE_SINK_TYPE;
use logtree_ports::SinkFactory;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Outcome of resolving a sink identifier.
#[derive(Clone)]
pub enum SinkResolution {
    /// Pure fan-out node without a sink of its own.
    Aggregate,
    /// Registered factory.
    Factory(Arc<dyn SinkFactory>),
}

impl fmt::Debug for SinkResolution {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aggregate => formatter.write_str("Aggregate"),
            Self::Factory(factory) => formatter
                .debug_tuple("Factory")
                .field(&factory.sink_type())
                .finish(),
        }
    }
}

/// Registry of sink factories, filled once at program setup.
#[derive(Clone, Default)]
pub struct SinkRegistry {
    factories: BTreeMap<String, Arc<dyn SinkFactory>>,
}

impl fmt::Debug for SinkRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SinkRegistry")
            .field("sink_types", &self.sink_types())
            .finish()
    }
}

impl SinkRegistry {
    /// Empty registry; only `aggregate` resolves.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under its identifier, returning any factory it replaces.
    pub fn register(&mut self, factory: Arc<dyn SinkFactory>) -> Option<Arc<dyn SinkFactory>> {
        let key = normalize(factory.sink_type());
        self.factories.insert(key, factory)
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, factory: Arc<dyn SinkFactory>) -> Self {
        self.register(factory);
        self
    }

    /// Whether `sink_type` resolves.
    #[must_use]
    pub fn contains(&self, sink_type: &str) -> bool {
        self.resolve(sink_type).is_some()
    }

    /// Resolve an identifier.
    #[must_use]
    pub fn resolve(&self, sink_type: &str) -> Option<SinkResolution> {
        let key = normalize(sink_type);
        if key == AGGREGATE_SINK_TYPE {
            return Some(SinkResolution::Aggregate);
        }
        self.factories
            .get(&key)
            .map(|factory| SinkResolution::Factory(Arc::clone(factory)))
    }

    /// Every resolvable identifier, sorted, `aggregate` included.
    #[must_use]
    pub fn sink_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.keys().cloned().collect();
        if !self.factories.contains_key(AGGREGATE_SINK_TYPE) {
            types.push(AGGREGATE_SINK_TYPE.to_string());
        }
        types.sort();
        types
    }
}

fn normalize(sink_type: &str) -> String {
    sink_type.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtree_domain::{LogRecord, SinkError};
    use logtree_ports::{Sink, SinkSection};

    #[derive(Debug)]
    struct Quiet;

    impl Sink for Quiet {
        fn write(&self, _record: &LogRecord, _formatted: &str) -> Result<(), SinkError> {
            Ok(())
        }
    }

    struct QuietFactory(&'static str);

    impl SinkFactory for QuietFactory {
        fn sink_type(&self) -> &str {
            self.0
        }

        fn build(&self, _section: &SinkSection) -> Result<Box<dyn Sink>, SinkError> {
            Ok(Box::new(Quiet))
        }
    }

    #[test]
    fn aggregate_always_resolves() {
        let registry = SinkRegistry::new();
        assert!(matches!(
            registry.resolve("Aggregate"),
            Some(SinkResolution::Aggregate)
        ));
        assert_eq!(registry.sink_types(), vec!["aggregate".to_string()]);
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let registry = SinkRegistry::new().with(Arc::new(QuietFactory("Console")));
        assert!(registry.contains("console"));
        assert!(registry.contains(" CONSOLE "));
        assert!(!registry.contains("file"));
        assert_eq!(
            registry.sink_types(),
            vec!["aggregate".to_string(), "console".to_string()]
        );
    }

    #[test]
    fn register_replaces_previous_factory() {
        let mut registry = SinkRegistry::new();
        assert!(registry.register(Arc::new(QuietFactory("null"))).is_none());
        assert!(registry.register(Arc::new(QuietFactory("NULL"))).is_some());
        assert_eq!(registry.sink_types().len(), 2);
    }
}
