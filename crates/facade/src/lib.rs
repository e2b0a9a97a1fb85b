//! # logtree-facade
//!
//! Facade API for consumers (the CLI and embedding applications).
//! This crate depends on `infra`, `app`, and `adapters`, and re-exports the
//! types needed to configure a tree and log through it.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Logging engine types.
pub use logtree_app::{Logger, LoggerNode, MessageFormatter, SinkRegistry, render_chain};
/// Built-in sinks and the host environment.
pub use logtree_adapters::{
    ColorMode, ConsoleSinkFactory, FileSinkFactory, JsonLinesSinkFactory, MailSinkFactory,
    MailTransport, NullSinkFactory, ProcessEnvironment, builtin_factories,
};
/// Config documents and loaders.
pub use logtree_config::{
    LoggingConfig, LoggingEnv, ValidatedLoggingConfig, logging_config_schema,
    parse_logging_config_json, parse_logging_config_toml, parse_logging_config_yaml,
};
/// Domain vocabulary.
pub use logtree_domain::{
    Context, ContextValue, ERROR_KEY, EXCEPTION_KEY, ErrorInfo, LogError, LogRecord, Message,
    Severity, SeverityRange, SinkError, Throwable,
};
/// Infra error type (shared error envelope).
pub use logtree_infra::InfraError;
/// Runtime, registry, and config report.
pub use logtree_infra::{ConfigReport, HookInstall, LoggingRuntime, default_sink_registry};
/// Sink contracts for custom sinks.
pub use logtree_ports::{Environment, Sink, SinkFactory, SinkOptions, SinkSection, StreamTarget};
/// Error envelope building blocks and secret redaction.
pub use logtree_shared::{ErrorCode, ErrorEnvelope, ErrorKind, is_secret_key, redact_if_secret};

/// Returns the facade crate version.
#[must_use]
pub const fn facade_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Validate that the provided env overrides can be parsed and merged into a config.
pub fn validate_env_parsing(env: &BTreeMap<String, String>) -> Result<(), InfraError> {
    logtree_infra::validate_env_parsing(env).map(|_| ())
}

/// Load and validate the effective config, returning deterministic pretty JSON.
pub fn load_effective_config_json(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<String, InfraError> {
    logtree_infra::load_effective_config_json(env, config_path, overrides_json)
}

/// Check a config against the built-in sinks.
pub fn check_config_with_defaults(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<ConfigReport, InfraError> {
    let environment: Arc<dyn Environment> =
        Arc::new(ProcessEnvironment::from_lookup(|name| env.get(name).cloned()));
    logtree_infra::check_config(
        env,
        config_path,
        overrides_json,
        &default_sink_registry(),
        environment,
    )
}

/// JSON Schema for the config document, pretty-printed.
pub fn logging_config_schema_json() -> Result<String, InfraError> {
    serde_json::to_string_pretty(&logging_config_schema()).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config schema: {error}"),
        )
    })
}

/// Sink identifiers the default registry resolves, sorted.
#[must_use]
pub fn registered_sink_types() -> Vec<String> {
    default_sink_registry().sink_types()
}

/// Build a tree from config and log a single record through it.
pub fn emit_record(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    level: &str,
    message: Message,
    context: Context,
) -> Result<(), InfraError> {
    let runtime = LoggingRuntime::load_with_env(env, config_path, overrides_json)?;
    let logger = runtime.logger();
    tracing::debug!(level, nodes = logger.node_count(), "emitting record");
    logger
        .log(level, message, context)
        .map_err(ErrorEnvelope::from)?;
    Ok(())
}
