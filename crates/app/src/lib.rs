//! # logtree-app
//!
//! The logging engine: formatting, error chain rendering, the node tree and
//! its construction from validated configuration.
//! This crate depends on `config`, `ports`, `domain`, and `shared`.

pub mod builder;
pub mod chain;
pub mod formatter;
pub mod logger;
pub mod node;
pub mod registry;

pub use builder::build_tree;
pub use chain::{CHAIN_SEPARATOR, TRUNCATION_MARKER, render_chain, render_context_error};
pub use formatter::{CONTEXT_PREFIX, MessageFormatter, render_context_block, render_message};
pub use logger::Logger;
pub use node::{LoggerNode, NodeSink};
pub use registry::{SinkRegistry, SinkResolution};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtree_domain::domain_crate_version;
    use logtree_ports::ports_crate_version;
    use logtree_shared::shared_crate_version;

    #[test]
    fn app_crate_compiles() {
        let version = app_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn app_can_use_ports_domain_shared() {
        let ports_version = ports_crate_version();
        let domain_version = domain_crate_version();
        let shared_version = shared_crate_version();

        assert!(!ports_version.is_empty());
        assert!(!domain_version.is_empty());
        assert!(!shared_version.is_empty());
    }
}
