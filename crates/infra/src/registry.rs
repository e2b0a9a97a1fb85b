//! Default sink registry wiring.

use logtree_adapters::builtin_factories;
use logtree_app::SinkRegistry;

/// Registry holding every built-in sink factory.
#[must_use]
pub fn default_sink_registry() -> SinkRegistry {
    builtin_factories()
        .into_iter()
        .fold(SinkRegistry::new(), SinkRegistry::with)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_lists_builtin_sinks() {
        let registry = default_sink_registry();
        assert_eq!(
            registry.sink_types(),
            vec!["aggregate", "console", "file", "json", "mail", "null"]
        );
        assert!(registry.contains("Console"));
    }
}
