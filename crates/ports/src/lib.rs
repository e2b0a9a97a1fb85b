//! # logtree-ports
//!
//! Sink and environment contracts for the logtree hexagonal architecture.
//!
//! This crate defines the interfaces between the logging engine and the
//! concrete sinks. It depends only on `domain` and `shared`.

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod environment;
pub mod options;
pub mod sink;

pub use environment::{Environment, StreamTarget};
pub use options::SinkOptions;
pub use sink::{SINK_CONTRACT_VERSION, Sink, SinkFactory, SinkSection};

// Re-export the domain types used in port signatures, so adapter crates
// can implement ports without directly depending on `logtree-domain`.
pub use logtree_domain::{Context, ContextValue, LogRecord, Message, Severity, SinkError};

#[cfg(test)]
mod tests {
    use super::*;
    use logtree_domain::domain_crate_version;
    use logtree_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]" || line == "[dev-dependencies]";
                continue;
            }
            if in_deps && line.starts_with("logtree-") {
                let key = line.split('=').next().unwrap_or("").trim();
                let name = key.split('.').next().unwrap_or("").trim();
                deps.push(name.to_string());
            }
        }

        deps
    }

    #[test]
    fn ports_depends_only_on_domain_and_shared() {
        let deps = workspace_deps();
        let allowed = ["logtree-domain", "logtree-shared"];

        for dep in &deps {
            assert!(
                allowed.contains(&dep.as_str()),
                "unexpected dependency found: {dep}"
            );
        }

        for expected in allowed {
            assert!(
                deps.iter().any(|dep| dep == expected),
                "missing dependency: {expected}"
            );
        }
    }

    #[test]
    fn ports_can_use_domain_and_shared() {
        assert!(!ports_crate_version().is_empty());
        assert!(!domain_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }

    #[derive(Debug)]
    struct Discard;

    impl Sink for Discard {
        fn write(&self, _record: &LogRecord, _formatted: &str) -> Result<(), SinkError> {
            Ok(())
        }
    }

    struct DiscardFactory;

    impl SinkFactory for DiscardFactory {
        fn sink_type(&self) -> &str {
            "discard"
        }

        fn build(&self, _section: &SinkSection) -> Result<Box<dyn Sink>, SinkError> {
            Ok(Box::new(Discard))
        }
    }

    #[test]
    fn factory_defaults_match_current_contract() {
        let factory = DiscardFactory;
        assert_eq!(factory.contract_version(), SINK_CONTRACT_VERSION);
        assert!(factory.default_message_format().is_none());
    }
}
