//! # logtree-infra
//!
//! Composition root: default sink wiring, the process-wide runtime with its
//! panic hook, and config/env checks used by CLI surfaces.
//! This crate depends on `app`, `adapters`, `config`, and `shared`.

/// Config loading helpers used by CLI surfaces.
pub mod config_check;
/// Environment validation helpers used by CLI surfaces.
pub mod env_check;
/// Default sink registry.
pub mod registry;
/// Process-wide runtime and panic hook.
pub mod runtime;

pub use config_check::{ConfigReport, check_config, load_config, load_effective_config_json};
pub use env_check::{InfraError, InfraResult, validate_env_parsing};
pub use registry::default_sink_registry;
pub use runtime::{HookInstall, LoggingRuntime, PANIC_MESSAGE, PANIC_TYPE_NAME};

/// Returns the infra crate version.
#[must_use]
pub const fn infra_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtree_adapters::adapters_crate_version;
    use logtree_app::app_crate_version;
    use logtree_config::config_crate_version;
    use logtree_shared::shared_crate_version;

    #[test]
    fn infra_can_use_app_adapters_config_shared() {
        assert!(!infra_crate_version().is_empty());
        assert!(!app_crate_version().is_empty());
        assert!(!adapters_crate_version().is_empty());
        assert!(!config_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
