//! Environment validation helpers for CLI surfaces.

use logtree_config::{LoggingConfig, LoggingEnv, apply_env_overrides};
use logtree_shared::ErrorEnvelope;
use std::collections::BTreeMap;

/// Infra-level error type (shared error envelope).
pub type InfraError = ErrorEnvelope;

/// Infra-level result type.
pub type InfraResult<T> = Result<T, InfraError>;

/// Validate that the provided env overrides can be parsed and merged into a config.
pub fn validate_env_parsing(env: &BTreeMap<String, String>) -> InfraResult<LoggingEnv> {
    let parsed = LoggingEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    apply_env_overrides(LoggingConfig::default(), &parsed)?;
    Ok(parsed)
}
