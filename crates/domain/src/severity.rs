//! Severity scale shared by filtering and formatting.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Ordered severity of a log record, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Detailed debug information.
    Debug = 0,
    /// Interesting events.
    Info = 1,
    /// Normal but significant events.
    Notice = 2,
    /// Exceptional occurrences that are not errors.
    Warning = 3,
    /// Runtime errors that do not require immediate action.
    Error = 4,
    /// Critical conditions.
    Critical = 5,
    /// Action must be taken immediately.
    Alert = 6,
    /// System is unusable.
    Emergency = 7,
}

impl Severity {
    /// Every severity in ascending rank order.
    pub const ALL: [Self; 8] = [
        Self::Debug,
        Self::Info,
        Self::Notice,
        Self::Warning,
        Self::Error,
        Self::Critical,
        Self::Alert,
        Self::Emergency,
    ];

    /// Integer rank in `0..=7`.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
            Self::Alert => "alert",
            Self::Emergency => "emergency",
        }
    }

    /// Resolve a caller-supplied level string.
    ///
    /// Matching is case-insensitive. Unrecognized strings resolve to
    /// [`Severity::Debug`]; this never fails.
    #[must_use]
    pub fn resolve(level: &str) -> Self {
        Self::from_str(level).unwrap_or(Self::Debug)
    }
}

/// Rank of a caller-supplied level string, `0` for unknown levels.
#[must_use]
pub fn rank(level: &str) -> u8 {
    Severity::resolve(level).rank()
}

/// Strict parse failure for configuration-supplied level names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity level \"{input}\"")]
pub struct UnknownSeverity {
    /// Rejected input.
    pub input: String,
}

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| UnknownSeverity {
                input: value.to_string(),
            })
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Inclusive `[min, max]` severity window owned by a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityRange {
    min: Severity,
    max: Severity,
}

impl SeverityRange {
    /// Window accepting every severity.
    pub const FULL: Self = Self {
        min: Severity::Debug,
        max: Severity::Emergency,
    };

    /// Build a window; `None` when `min` ranks above `max`.
    #[must_use]
    pub fn new(min: Severity, max: Severity) -> Option<Self> {
        (min <= max).then_some(Self { min, max })
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(self) -> Severity {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(self) -> Severity {
        self.max
    }

    /// Whether `severity` falls inside the window.
    #[must_use]
    pub fn accepts(self, severity: Severity) -> bool {
        self.min <= severity && severity <= self.max
    }
}

impl Default for SeverityRange {
    fn default() -> Self {
        Self::FULL
    }
}

impl fmt::Display for SeverityRange {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[{}, {}]", self.min, self.max)
    }
}
