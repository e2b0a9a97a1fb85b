//! Environment variable parsing and env-to-config merging.
//!
//! This module keeps env parsing:
//! - strict (invalid values fail fast)
//! - tree-aware (root range overrides gate the whole tree)
//! - safe (secret-looking values are redacted in error metadata)

use crate::schema::{LoggingConfig, NodeConfig, TimeZoneSetting, ValidatedLoggingConfig};
use logtree_domain::Severity;
use logtree_shared::{ErrorCode, ErrorEnvelope, redact_if_secret};
use std::collections::BTreeMap;
use std::fmt;

/// Env var: lowest severity accepted by the root section.
pub const ENV_MIN_LEVEL: &str = "LOGTREE_MIN_LEVEL";
/// Env var: highest severity accepted by the root section.
pub const ENV_MAX_LEVEL: &str = "LOGTREE_MAX_LEVEL";
/// Env var: process name for sections that set none.
pub const ENV_PROCESS_NAME: &str = "LOGTREE_PROCESS_NAME";
/// Env var: time format applied to every section.
pub const ENV_TIME_FORMAT: &str = "LOGTREE_TIME_FORMAT";
/// Env var: time zone (`utc` or `local`) applied to every section.
pub const ENV_TIME_ZONE: &str = "LOGTREE_TIME_ZONE";

const ALL_ENV_VARS: [&str; 5] = [
    ENV_MIN_LEVEL,
    ENV_MAX_LEVEL,
    ENV_PROCESS_NAME,
    ENV_TIME_FORMAT,
    ENV_TIME_ZONE,
];

/// Parsed env overrides for the logging config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingEnv {
    /// Root lower bound.
    pub min_level: Option<Severity>,
    /// Root upper bound.
    pub max_level: Option<Severity>,
    /// Fallback process name.
    pub process_name: Option<String>,
    /// Tree-wide time format.
    pub time_format: Option<String>,
    /// Tree-wide time zone.
    pub time_zone: Option<TimeZoneSetting>,
}

impl LoggingEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            min_level: parse_optional_level(map, ENV_MIN_LEVEL)?,
            max_level: parse_optional_level(map, ENV_MAX_LEVEL)?,
            process_name: parse_optional_trimmed_string(map, ENV_PROCESS_NAME)?,
            // Time formats may carry meaningful surrounding whitespace.
            time_format: parse_optional_raw_string(map, ENV_TIME_FORMAT)?,
            time_zone: parse_optional_time_zone(map, ENV_TIME_ZONE)?,
        })
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let mut map = BTreeMap::new();
        for name in ALL_ENV_VARS {
            if let Ok(value) = std::env::var(name) {
                map.insert(name.to_string(), value);
            }
        }

        Self::from_map(&map)
    }

    /// Returns true when no override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min_level.is_none()
            && self.max_level.is_none()
            && self.process_name.is_none()
            && self.time_format.is_none()
            && self.time_zone.is_none()
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
pub fn apply_env_overrides(
    base: LoggingConfig,
    env: &LoggingEnv,
) -> Result<ValidatedLoggingConfig, ErrorEnvelope> {
    let mut config = base;
    if let Some(level) = env.min_level {
        config.root.min_level = level.as_str().to_string();
    }
    if let Some(level) = env.max_level {
        config.root.max_level = level.as_str().to_string();
    }
    apply_tree_overrides(&mut config.root, env);

    config.validate_and_normalize().map_err(Into::into)
}

fn apply_tree_overrides(node: &mut NodeConfig, env: &LoggingEnv) {
    if node.process_name.is_none() {
        node.process_name.clone_from(&env.process_name);
    }
    if let Some(format) = env.time_format.as_ref() {
        node.time_format.clone_from(format);
    }
    if let Some(zone) = env.time_zone {
        node.time_zone = zone;
    }
    for child in &mut node.children {
        apply_tree_overrides(child, env);
    }
}

/// Env parsing errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Level env var is not on the severity scale.
    InvalidLevel {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// Enum env var had an invalid value.
    InvalidEnum {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::config("empty_env_var"),
            Self::InvalidLevel { .. } => ErrorCode::config("invalid_env_level"),
            Self::InvalidEnum { .. } => ErrorCode::config("invalid_env_enum"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidLevel { var, value } => {
                write!(formatter, "{var} must be a severity level (got \"{value}\")")
            },
            Self::InvalidEnum { var, .. } => write!(formatter, "{var} has an unsupported value"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidLevel { var, value } | EnvParseError::InvalidEnum { var, value } => {
                envelope
                    .with_metadata("env_var", var)
                    .with_metadata("value", redact_if_secret(var, &value))
            },
        }
    }
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<String>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    Ok(Some(trimmed.to_owned()))
}

fn parse_optional_raw_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<String>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }
    Ok(Some(raw.clone()))
}

fn parse_optional_level(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Severity>, EnvParseError> {
    let Some(value) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };

    value
        .parse::<Severity>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidLevel { var, value })
}

fn parse_optional_time_zone(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<TimeZoneSetting>, EnvParseError> {
    let Some(value) = parse_optional_trimmed_string(map, var)? else {
        return Ok(None);
    };

    match value.to_ascii_lowercase().as_str() {
        "utc" => Ok(Some(TimeZoneSetting::Utc)),
        "local" => Ok(Some(TimeZoneSetting::Local)),
        _ => Err(EnvParseError::InvalidEnum { var, value }),
    }
}
