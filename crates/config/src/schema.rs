//! Logging configuration schema and validation.
//!
//! A config document is a tree of sections. The root section carries the
//! document `version`; every section may name a sink type (`sink`, or the
//! legacy `logger` key), its own severity window and formats, an ordered
//! list of `children` (or `sections`), and any number of sink-specific
//! options which are passed through untouched.

use logtree_domain::{
    MessageTemplate, Severity, SeverityRange, TemplateError, TimeFormat, TimeFormatError, TimeZone,
};
use logtree_shared::{ErrorCode, ErrorEnvelope};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Current supported config version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Sink identifier reserved for pure fan-out sections.
pub const AGGREGATE_SINK_TYPE: &str = "aggregate";

const DEFAULT_MIN_LEVEL: &str = "debug";
const DEFAULT_MAX_LEVEL: &str = "emergency";
const ROOT_PATH: &str = "root";

/// Zone used when rendering timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeZoneSetting {
    /// Render in UTC.
    #[default]
    Utc,
    /// Render in the host's local zone.
    Local,
}

impl From<TimeZoneSetting> for TimeZone {
    fn from(value: TimeZoneSetting) -> Self {
        match value {
            TimeZoneSetting::Utc => Self::Utc,
            TimeZoneSetting::Local => Self::Local,
        }
    }
}

/// What a node does when its sink fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SinkFailurePolicy {
    /// Report through diagnostics and keep dispatching.
    #[default]
    Report,
    /// Return the failure to the caller of `log()`.
    Propagate,
}

/// One section of the logger tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeConfig {
    /// Sink type identifier; sections without one are ignored.
    #[serde(alias = "logger", skip_serializing_if = "Option::is_none")]
    pub sink: Option<String>,
    /// Lowest accepted severity.
    pub min_level: String,
    /// Highest accepted severity.
    pub max_level: String,
    /// Process name rendered in slot 2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    /// strftime format with the `u` microsecond token.
    pub time_format: String,
    /// Zone timestamps are rendered in.
    pub time_zone: TimeZoneSetting,
    /// Positional message template; sink default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_format: Option<String>,
    /// Sink failure handling.
    pub on_sink_failure: SinkFailurePolicy,
    /// Ordered child sections.
    #[serde(alias = "sections", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeConfig>,
    /// Sink-specific options (`path`, `mailTo`, `stream`, ...).
    #[serde(flatten)]
    pub options: BTreeMap<String, Value>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            sink: None,
            min_level: DEFAULT_MIN_LEVEL.to_string(),
            max_level: DEFAULT_MAX_LEVEL.to_string(),
            process_name: None,
            time_format: logtree_domain::DEFAULT_TIME_FORMAT.to_string(),
            time_zone: TimeZoneSetting::default(),
            message_format: None,
            on_sink_failure: SinkFailurePolicy::default(),
            children: Vec::new(),
            options: BTreeMap::new(),
        }
    }
}

/// Root configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Config schema version.
    #[serde(default = "current_version")]
    pub version: u32,
    /// Root section.
    #[serde(flatten)]
    pub root: NodeConfig,
}

const fn current_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            root: NodeConfig::default(),
        }
    }
}

impl LoggingConfig {
    /// Validate the whole tree and resolve levels and formats.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedLoggingConfig, ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }

        normalize_node(&mut self.root);
        let root = validate_node(&self.root, ROOT_PATH.to_string())?;
        Ok(ValidatedLoggingConfig { raw: self, root })
    }
}

fn normalize_node(node: &mut NodeConfig) {
    node.sink = node
        .sink
        .take()
        .map(|sink| sink.trim().to_ascii_lowercase())
        .filter(|sink| !sink.is_empty());
    node.process_name = node
        .process_name
        .take()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());
    node.min_level = node.min_level.trim().to_ascii_lowercase();
    node.max_level = node.max_level.trim().to_ascii_lowercase();
    for child in &mut node.children {
        normalize_node(child);
    }
}

fn validate_node(node: &NodeConfig, path: String) -> Result<ValidatedNode, ConfigSchemaError> {
    let min = parse_level(&path, "minLevel", &node.min_level)?;
    let max = parse_level(&path, "maxLevel", &node.max_level)?;
    let range = SeverityRange::new(min, max).ok_or_else(|| ConfigSchemaError::InvertedRange {
        path: path.clone(),
        min,
        max,
    })?;

    let time_format =
        TimeFormat::parse(&node.time_format).map_err(|source| ConfigSchemaError::InvalidTimeFormat {
            path: path.clone(),
            source,
        })?;

    let message_format = node
        .message_format
        .as_deref()
        .map(MessageTemplate::parse)
        .transpose()
        .map_err(|source| ConfigSchemaError::InvalidMessageFormat {
            path: path.clone(),
            source,
        })?;

    let children = node
        .children
        .iter()
        .enumerate()
        .map(|(index, child)| {
            let child_path = if path == ROOT_PATH {
                format!("children[{index}]")
            } else {
                format!("{path}.children[{index}]")
            };
            validate_node(child, child_path)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidatedNode {
        path,
        sink_type: node.sink.clone(),
        range,
        process_name: node.process_name.clone(),
        time_format,
        time_zone: node.time_zone.into(),
        message_format,
        on_sink_failure: node.on_sink_failure,
        options: node.options.clone(),
        children,
    })
}

fn parse_level(path: &str, field: &'static str, value: &str) -> Result<Severity, ConfigSchemaError> {
    value
        .parse::<Severity>()
        .map_err(|_| ConfigSchemaError::InvalidLevel {
            path: path.to_string(),
            field,
            value: value.to_string(),
        })
}

/// A section after validation, with levels and formats resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedNode {
    /// Config path, e.g. `children[1].children[0]`.
    pub path: String,
    /// Normalized (trimmed, lowercase) sink type.
    pub sink_type: Option<String>,
    /// Severity window.
    pub range: SeverityRange,
    /// Process name.
    pub process_name: Option<String>,
    /// Parsed time format.
    pub time_format: TimeFormat,
    /// Rendering zone.
    pub time_zone: TimeZone,
    /// Parsed template, when the section sets one.
    pub message_format: Option<MessageTemplate>,
    /// Sink failure handling.
    pub on_sink_failure: SinkFailurePolicy,
    /// Sink-specific options.
    pub options: BTreeMap<String, Value>,
    /// Validated children in declared order.
    pub children: Vec<ValidatedNode>,
}

impl ValidatedNode {
    /// Number of sections in this subtree, ignored ones included.
    #[must_use]
    pub fn section_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Self::section_count)
            .sum::<usize>()
    }
}

/// Validated config wrapper.
#[derive(Debug, Clone)]
pub struct ValidatedLoggingConfig {
    raw: LoggingConfig,
    root: ValidatedNode,
}

impl ValidatedLoggingConfig {
    /// Validated root section.
    #[must_use]
    pub const fn root(&self) -> &ValidatedNode {
        &self.root
    }

    /// Borrow the raw config.
    #[must_use]
    pub const fn as_ref(&self) -> &LoggingConfig {
        &self.raw
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> LoggingConfig {
        self.raw
    }
}

impl AsRef<LoggingConfig> for ValidatedLoggingConfig {
    fn as_ref(&self) -> &LoggingConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedLoggingConfig {
    type Target = LoggingConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Parse and validate a JSON config document.
pub fn parse_logging_config_json(input: &str) -> Result<ValidatedLoggingConfig, ErrorEnvelope> {
    let config: LoggingConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::config("invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;
    config.validate_and_normalize().map_err(Into::into)
}

/// Parse and validate a TOML config document.
pub fn parse_logging_config_toml(input: &str) -> Result<ValidatedLoggingConfig, ErrorEnvelope> {
    let config: LoggingConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::config("invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;
    config.validate_and_normalize().map_err(Into::into)
}

/// Parse and validate a YAML config document.
pub fn parse_logging_config_yaml(input: &str) -> Result<ValidatedLoggingConfig, ErrorEnvelope> {
    let config: LoggingConfig = serde_yaml_ng::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::config("invalid_yaml"),
            format!("invalid config YAML: {error}"),
        )
    })?;
    config.validate_and_normalize().map_err(Into::into)
}

/// Config schema validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this binary.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A level name is not on the severity scale.
    InvalidLevel {
        /// Section path.
        path: String,
        /// Field name (`minLevel` or `maxLevel`).
        field: &'static str,
        /// Rejected value.
        value: String,
    },
    /// `minLevel` ranks above `maxLevel`.
    InvertedRange {
        /// Section path.
        path: String,
        /// Configured lower bound.
        min: Severity,
        /// Configured upper bound.
        max: Severity,
    },
    /// `timeFormat` failed to parse.
    InvalidTimeFormat {
        /// Section path.
        path: String,
        /// Parse failure.
        source: TimeFormatError,
    },
    /// `messageFormat` failed to parse.
    InvalidMessageFormat {
        /// Section path.
        path: String,
        /// Parse failure.
        source: TemplateError,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::config("unsupported_version"),
            Self::InvalidLevel { .. } => ErrorCode::config("invalid_level"),
            Self::InvertedRange { .. } => ErrorCode::config("inverted_level_range"),
            Self::InvalidTimeFormat { .. } => ErrorCode::config("invalid_time_format"),
            Self::InvalidMessageFormat { .. } => ErrorCode::config("invalid_message_format"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => write!(
                formatter,
                "unsupported config version {found} (supported: {supported})"
            ),
            Self::InvalidLevel { path, field, value } => {
                write!(formatter, "{path}.{field}: unknown severity level \"{value}\"")
            },
            Self::InvertedRange { path, min, max } => write!(
                formatter,
                "{path}: minLevel ({min}) must not rank above maxLevel ({max})"
            ),
            Self::InvalidTimeFormat { path, source } => {
                write!(formatter, "{path}.timeFormat: {source}")
            },
            Self::InvalidMessageFormat { path, source } => {
                write!(formatter, "{path}.messageFormat: {source}")
            },
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::InvalidLevel { path, field, value } => envelope
                .at_path(path)
                .with_metadata("field", field)
                .with_metadata("value", value),
            ConfigSchemaError::InvertedRange { path, min, max } => envelope
                .at_path(path)
                .with_metadata("minLevel", min.to_string())
                .with_metadata("maxLevel", max.to_string()),
            ConfigSchemaError::InvalidTimeFormat { path, .. } => envelope
                .at_path(path)
                .with_metadata("field", "timeFormat"),
            ConfigSchemaError::InvalidMessageFormat { path, .. } => envelope
                .at_path(path)
                .with_metadata("field", "messageFormat"),
        }
    }
}
