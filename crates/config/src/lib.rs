//! # logtree-config
//!
//! Configuration schema, validation, and normalization for the logger tree.
//! This crate depends on `domain` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (env + file + overrides).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;
/// JSON Schema export for the config document.
pub mod schema_export;

pub use schema::{
    AGGREGATE_SINK_TYPE, CURRENT_CONFIG_VERSION, ConfigSchemaError, LoggingConfig, NodeConfig,
    SinkFailurePolicy, TimeZoneSetting, ValidatedLoggingConfig, ValidatedNode,
    parse_logging_config_json, parse_logging_config_toml, parse_logging_config_yaml,
};

pub use env::{
    ENV_MAX_LEVEL, ENV_MIN_LEVEL, ENV_PROCESS_NAME, ENV_TIME_FORMAT, ENV_TIME_ZONE, EnvParseError,
    LoggingEnv, apply_env_overrides,
};
pub use load::{
    ConfigFormat, detect_config_format, load_logging_config_from_path,
    load_logging_config_from_sources, load_logging_config_std_env, to_pretty_json, to_pretty_toml,
};
pub use schema_export::logging_config_schema;

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtree_domain::domain_crate_version;
    use logtree_shared::shared_crate_version;

    #[test]
    fn config_crate_compiles() {
        let version = config_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn config_can_use_domain_and_shared() {
        let domain_version = domain_crate_version();
        let shared_version = shared_crate_version();

        assert!(!domain_version.is_empty());
        assert!(!shared_version.is_empty());
    }
}
