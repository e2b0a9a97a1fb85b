//! Config loading helpers (env + file + overrides).
//!
//! The loader is responsible for deterministic merge order and surfacing
//! user-facing errors as typed `ErrorEnvelope`s.

use crate::{LoggingConfig, LoggingEnv, ValidatedLoggingConfig, apply_env_overrides};
use logtree_shared::{ErrorCode, ErrorEnvelope};
use serde_json::Value;
use std::path::Path;

/// Supported config document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON (also used for paths without an extension).
    Json,
    /// TOML.
    Toml,
    /// YAML (`.yaml` or `.yml`).
    Yaml,
}

impl ConfigFormat {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
            Self::Yaml => "yaml",
        }
    }
}

/// Load the logging config from sources using a deterministic precedence order.
///
/// Precedence (highest wins):
/// - env overrides (`LoggingEnv`)
/// - overrides JSON (partial config, deep-merged; arrays replace)
/// - config document
/// - defaults (`LoggingConfig::default()`)
pub fn load_logging_config_from_sources(
    config_json: Option<&str>,
    overrides_json: Option<&str>,
    env: &LoggingEnv,
) -> Result<ValidatedLoggingConfig, ErrorEnvelope> {
    let document = match config_json {
        None => None,
        Some(input) => Some(parse_document(input, ConfigFormat::Json)?),
    };
    load_from_document(document, overrides_json, env)
}

/// Load the logging config from an optional file path.
pub fn load_logging_config_from_path(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    env: &LoggingEnv,
) -> Result<ValidatedLoggingConfig, ErrorEnvelope> {
    let document = match config_path {
        None => None,
        Some(path) => {
            let format = detect_config_format(path)?;
            let config_text = read_config_file(path)?;
            let document = parse_document(&config_text, format)
                .map_err(|error| error.at_path(path.to_string_lossy().to_string()))?;
            Some(document)
        },
    };
    load_from_document(document, overrides_json, env)
}

/// Load the logging config from std env and an optional file path.
pub fn load_logging_config_std_env(
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<ValidatedLoggingConfig, ErrorEnvelope> {
    let env = LoggingEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_logging_config_from_path(config_path, overrides_json, &env)
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &LoggingConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::config("serialize_json"),
            format!("failed to serialize config: {error}"),
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as deterministic pretty TOML (with trailing newline).
pub fn to_pretty_toml(config: &LoggingConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::config("serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Pick the document format from a path's extension.
pub fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some("yaml" | "yml") => Ok(ConfigFormat::Yaml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::config("unsupported_format"),
            "unsupported config format; use .json, .toml, .yaml or .yml",
        )
        .with_metadata("extension", other.to_string())),
    }
}

fn load_from_document(
    document: Option<Value>,
    overrides_json: Option<&str>,
    env: &LoggingEnv,
) -> Result<ValidatedLoggingConfig, ErrorEnvelope> {
    let mut document = document.unwrap_or_else(|| Value::Object(serde_json::Map::new()));

    if let Some(input) = overrides_json {
        let overrides = parse_overrides_json(input)?;
        merge_values(&mut document, overrides);
    }

    let config: LoggingConfig = serde_json::from_value(document).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::config("invalid_config"),
            format!("config does not match the logging schema: {error}"),
        )
    })?;

    // env is applied last and also validates/normalizes the resulting config.
    apply_env_overrides(config, env)
}

fn parse_document(input: &str, format: ConfigFormat) -> Result<Value, ErrorEnvelope> {
    let parsed = match format {
        ConfigFormat::Json => serde_json::from_str::<Value>(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::config("invalid_json"),
                format!("invalid config JSON: {error}"),
            )
        }),
        ConfigFormat::Toml => toml::from_str::<Value>(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::config("invalid_toml"),
                format!("invalid config TOML: {error}"),
            )
        }),
        ConfigFormat::Yaml => serde_yaml_ng::from_str::<Value>(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::config("invalid_yaml"),
                format!("invalid config YAML: {error}"),
            )
        }),
    };

    let value = parsed.map_err(|error| error.with_metadata("source", "config"))?;
    match value {
        Value::Object(_) => Ok(value),
        // An empty YAML document parses as null.
        Value::Null => Ok(Value::Object(serde_json::Map::new())),
        _ => Err(ErrorEnvelope::expected(
            ErrorCode::config("invalid_config"),
            "config document must be a mapping at the top level",
        )
        .with_metadata("source", "config")
        .with_metadata("format", format.as_str())),
    }
}

fn parse_overrides_json(input: &str) -> Result<Value, ErrorEnvelope> {
    let value: Value = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::config("invalid_json"),
            format!("invalid overrides JSON: {error}"),
        )
        .with_metadata("source", "overrides")
    })?;

    if value.is_object() {
        Ok(value)
    } else {
        Err(ErrorEnvelope::expected(
            ErrorCode::config("invalid_json"),
            "overrides JSON must be an object",
        )
        .with_metadata("source", "overrides"))
    }
}

fn merge_values(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    },
                }
            }
        },
        (slot, value) => *slot = value,
    }
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::config("config_file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::config("config_file_permission_denied")
            },
            _ => ErrorCode::config("config_file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read config file: {error}"))
            .at_path(path.to_string_lossy().to_string())
    })
}
