//! Timestamp formatting with a microsecond token.
//!
//! Formats are chrono strftime strings plus one extra token: a bare `u`
//! expands to the zero-padded six-digit microsecond fraction. Write `\u` for
//! a literal `u`. Strftime directives such as `%u` are left to chrono.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use std::fmt::Write as _;

/// Fallback time format for sections that set none.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S.u %Z";

/// Zone a timestamp is rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeZone {
    /// Coordinated universal time.
    #[default]
    Utc,
    /// The host's local zone.
    Local,
}

/// Time format parse failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeFormatError {
    /// Format string is empty.
    #[error("time format must be non-empty")]
    Empty,
    /// chrono rejected a strftime directive.
    #[error("invalid strftime directive in \"{fragment}\"")]
    InvalidDirective {
        /// Offending fragment.
        fragment: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Strftime(String),
    Micros,
}

/// Parsed time format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFormat {
    source: String,
    pieces: Vec<Piece>,
}

impl TimeFormat {
    /// Parse and validate a format string.
    pub fn parse(source: &str) -> Result<Self, TimeFormatError> {
        if source.is_empty() {
            return Err(TimeFormatError::Empty);
        }

        let mut pieces = Vec::new();
        let mut current = String::new();
        let mut chars = source.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '%' => {
                    current.push('%');
                    while let Some(&modifier) = chars.peek() {
                        if matches!(modifier, '-' | '_' | '0'..='9' | '.' | ':' | '#') {
                            current.push(modifier);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if let Some(directive) = chars.next() {
                        current.push(directive);
                    }
                },
                '\\' if chars.peek() == Some(&'u') => {
                    chars.next();
                    current.push('u');
                },
                'u' => {
                    if !current.is_empty() {
                        pieces.push(Piece::Strftime(std::mem::take(&mut current)));
                    }
                    pieces.push(Piece::Micros);
                },
                other => current.push(other),
            }
        }
        if !current.is_empty() {
            pieces.push(Piece::Strftime(current));
        }

        for piece in &pieces {
            if let Piece::Strftime(fragment) = piece {
                if StrftimeItems::new(fragment).any(|item| matches!(item, Item::Error)) {
                    return Err(TimeFormatError::InvalidDirective {
                        fragment: fragment.clone(),
                    });
                }
            }
        }

        Ok(Self {
            source: source.to_string(),
            pieces,
        })
    }

    /// Format string as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Render `instant` in `zone`.
    #[must_use]
    pub fn format(&self, instant: DateTime<Utc>, zone: TimeZone) -> String {
        let micros = instant.timestamp_subsec_micros() % 1_000_000;
        let mut output = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Micros => {
                    let _ = write!(output, "{micros:06}");
                },
                Piece::Strftime(fragment) => {
                    let written = match zone {
                        TimeZone::Utc => write!(output, "{}", instant.format(fragment)),
                        TimeZone::Local => write!(
                            output,
                            "{}",
                            instant.with_timezone(&Local).format(fragment)
                        ),
                    };
                    if written.is_err() {
                        output.push_str(fragment);
                    }
                },
            }
        }
        output
    }
}

impl Default for TimeFormat {
    fn default() -> Self {
        Self::parse(DEFAULT_TIME_FORMAT).unwrap_or_else(|_| Self {
            source: DEFAULT_TIME_FORMAT.to_string(),
            pieces: vec![Piece::Strftime("%+".to_string())],
        })
    }
}
