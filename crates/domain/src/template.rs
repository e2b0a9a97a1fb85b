//! Positional message templates.
//!
//! Templates use `%N$s` slots (1-based, `1..=7`), sequential `%s`, and `%%`
//! for a literal percent sign. Slots map to the formatter's fields in order:
//! time, process name, session id, address, level label, message, context.

use std::fmt;
use std::str::FromStr;

/// Number of fields a template can reference.
pub const FIELD_COUNT: usize = 7;

/// Fallback template for sections that set none.
pub const DEFAULT_MESSAGE_FORMAT: &str = "%1$s %2$s [%3$s] [%4$s] [%5$s] %6$s%7$s";

/// Template parse failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// `%N$s` references a slot outside `1..=7`.
    #[error("slot {slot} at offset {offset} is outside 1..={FIELD_COUNT}")]
    SlotOutOfRange {
        /// Referenced slot.
        slot: usize,
        /// Byte offset of the directive.
        offset: usize,
    },
    /// A directive other than `s` or `%`.
    #[error("unsupported directive at offset {offset}; only %s, %N$s and %% are allowed")]
    UnsupportedDirective {
        /// Byte offset of the directive.
        offset: usize,
    },
    /// The template ends inside a directive.
    #[error("template ends inside a directive at offset {offset}")]
    Truncated {
        /// Byte offset of the directive.
        offset: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(usize),
}

/// Parsed, validated message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl MessageTemplate {
    /// Parse a template; every slot reference is validated here.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut next_sequential = 0usize;
        let mut chars = source.char_indices().peekable();

        while let Some((offset, ch)) = chars.next() {
            if ch != '%' {
                literal.push(ch);
                continue;
            }

            match chars.next() {
                None => return Err(TemplateError::Truncated { offset }),
                Some((_, '%')) => literal.push('%'),
                Some((_, 's')) => {
                    next_sequential += 1;
                    push_field(&mut segments, &mut literal, next_sequential, offset)?;
                },
                Some((_, digit)) if digit.is_ascii_digit() => {
                    let mut slot = digit.to_digit(10).map_or(0, |value| value as usize);
                    loop {
                        match chars.next() {
                            Some((_, next)) if next.is_ascii_digit() => {
                                let value = next.to_digit(10).map_or(0, |value| value as usize);
                                slot = slot.saturating_mul(10).saturating_add(value);
                            },
                            Some((_, '$')) => break,
                            Some(_) => return Err(TemplateError::UnsupportedDirective { offset }),
                            None => return Err(TemplateError::Truncated { offset }),
                        }
                    }
                    match chars.next() {
                        Some((_, 's')) => push_field(&mut segments, &mut literal, slot, offset)?,
                        Some(_) => return Err(TemplateError::UnsupportedDirective { offset }),
                        None => return Err(TemplateError::Truncated { offset }),
                    }
                },
                Some(_) => return Err(TemplateError::UnsupportedDirective { offset }),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Template text as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitute `fields` and trim surrounding whitespace.
    #[must_use]
    pub fn render(&self, fields: &[&str; FIELD_COUNT]) -> String {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Field(index) => {
                    output.push_str(fields.get(*index).copied().unwrap_or_default());
                },
            }
        }
        output.trim().to_string()
    }
}

fn push_field(
    segments: &mut Vec<Segment>,
    literal: &mut String,
    slot: usize,
    offset: usize,
) -> Result<(), TemplateError> {
    if !(1..=FIELD_COUNT).contains(&slot) {
        return Err(TemplateError::SlotOutOfRange { slot, offset });
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
    segments.push(Segment::Field(slot - 1));
    Ok(())
}

impl Default for MessageTemplate {
    fn default() -> Self {
        // The default template is a compile-time constant with valid slots.
        Self::parse(DEFAULT_MESSAGE_FORMAT).unwrap_or_else(|_| Self {
            source: String::new(),
            segments: Vec::new(),
        })
    }
}

impl FromStr for MessageTemplate {
    type Err = TemplateError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::parse(source)
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: [&str; FIELD_COUNT] = ["T", "P", "S", "A", "ERROR", "boom", ""];

    #[test]
    fn positional_slots_render_in_any_order() -> Result<(), TemplateError> {
        let template = MessageTemplate::parse("%5$s %6$s")?;
        assert_eq!(template.render(&FIELDS), "ERROR boom");

        let reversed = MessageTemplate::parse("%6$s <- %1$s")?;
        assert_eq!(reversed.render(&FIELDS), "boom <- T");
        Ok(())
    }

    #[test]
    fn default_template_trims_empty_trailing_block() {
        let template = MessageTemplate::default();
        assert_eq!(template.as_str(), DEFAULT_MESSAGE_FORMAT);
        assert_eq!(template.render(&FIELDS), "T P [S] [A] [ERROR] boom");
    }

    #[test]
    fn sequential_and_percent_escapes() -> Result<(), TemplateError> {
        let template = MessageTemplate::parse("%s|%s|100%%|%6$s|%s")?;
        assert_eq!(template.render(&FIELDS), "T|P|100%|boom|S");
        Ok(())
    }

    #[test]
    fn invalid_templates_are_rejected() {
        assert_eq!(
            MessageTemplate::parse("%8$s"),
            Err(TemplateError::SlotOutOfRange { slot: 8, offset: 0 })
        );
        assert_eq!(
            MessageTemplate::parse("x %0$s"),
            Err(TemplateError::SlotOutOfRange { slot: 0, offset: 2 })
        );
        assert_eq!(
            MessageTemplate::parse("%d"),
            Err(TemplateError::UnsupportedDirective { offset: 0 })
        );
        assert_eq!(
            MessageTemplate::parse("%5$d"),
            Err(TemplateError::UnsupportedDirective { offset: 0 })
        );
        assert_eq!(
            MessageTemplate::parse("tail %"),
            Err(TemplateError::Truncated { offset: 5 })
        );
        assert!(MessageTemplate::parse("%s%s%s%s%s%s%s%s").is_err());
    }
}
