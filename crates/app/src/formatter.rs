//! Message formatting.
//!
//! A formatter computes seven fields for a record and substitutes them into
//! its template:
//!
//! 1. time, rendered with the node's time format and zone
//! 2. process name
//! 3. session id from the environment
//! 4. remote address from the environment
//! 5. level label, the caller's level string uppercased
//! 6. message, with `{key}` placeholders interpolated
//! 7. context block, the leftover context and any error chains

use crate::chain::render_context_error;
use logtree_domain::{
    Context, LogError, LogRecord, Message, MessageTemplate, RESERVED_ERROR_KEYS,
    TimeFormat, TimeZone, is_reserved_error_key,
};
use logtree_ports::Environment;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Prefix of the context dump in slot 7.
pub const CONTEXT_PREFIX: &str = "\nContext: ";

/// Per-node record formatter.
#[derive(Clone)]
pub struct MessageFormatter {
    template: MessageTemplate,
    time_format: TimeFormat,
    time_zone: TimeZone,
    process_name: Option<String>,
    environment: Arc<dyn Environment>,
}

impl fmt::Debug for MessageFormatter {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MessageFormatter")
            .field("template", &self.template.as_str())
            .field("time_format", &self.time_format.as_str())
            .field("time_zone", &self.time_zone)
            .field("process_name", &self.process_name)
            .finish_non_exhaustive()
    }
}

impl MessageFormatter {
    /// Formatter with default template and time settings.
    #[must_use]
    pub fn new(environment: Arc<dyn Environment>) -> Self {
        Self {
            template: MessageTemplate::default(),
            time_format: TimeFormat::default(),
            time_zone: TimeZone::default(),
            process_name: None,
            environment,
        }
    }

    /// Replace the template.
    #[must_use]
    pub fn with_template(mut self, template: MessageTemplate) -> Self {
        self.template = template;
        self
    }

    /// Replace the time format and zone.
    #[must_use]
    pub fn with_time(mut self, format: TimeFormat, zone: TimeZone) -> Self {
        self.time_format = format;
        self.time_zone = zone;
        self
    }

    /// Set the process name.
    #[must_use]
    pub fn with_process_name(mut self, name: Option<String>) -> Self {
        self.process_name = name;
        self
    }

    /// Template in use.
    #[must_use]
    pub const fn template(&self) -> &MessageTemplate {
        &self.template
    }

    /// Build the final text for `record`.
    pub fn format(&self, record: &LogRecord) -> Result<String, LogError> {
        let time = self.time_format.format(record.timestamp(), self.time_zone);
        let session = self.environment.session_id().unwrap_or_default();
        let address = self.environment.remote_address().unwrap_or_default();
        let label = record.level().to_uppercase();

        let mut context = record.context().clone();
        let message = render_message(record.message(), &mut context);
        let block = render_context_block(&context)?;

        let fields = [
            time.as_str(),
            self.process_name.as_deref().unwrap_or_default(),
            session.as_str(),
            address.as_str(),
            label.as_str(),
            message.as_str(),
            block.as_str(),
        ];
        Ok(self.template.render(&fields))
    }
}

/// Render the message field, consuming interpolated keys from `context`.
///
/// Structured messages are pretty-printed and never interpolated. In text
/// messages every `{key}` naming a non-reserved context entry is replaced by
/// the entry's text and the entry is removed.
pub fn render_message(message: &Message, context: &mut Context) -> String {
    match message {
        Message::Structured(value) => pretty_json(value),
        Message::Text(text) => {
            let (rendered, consumed) = interpolate(text, context);
            for key in consumed {
                context.remove(&key);
            }
            rendered
        },
    }
}

fn interpolate(text: &str, context: &Context) -> (String, BTreeSet<String>) {
    let mut output = String::with_capacity(text.len());
    let mut consumed = BTreeSet::new();
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            output.push_str(&rest[open..]);
            return (output, consumed);
        };

        let key = &after_open[..close];
        match context.get(key) {
            Some(value) if !key.contains('{') && !is_reserved_error_key(key) => {
                output.push_str(&value.interpolation_text());
                consumed.insert(key.to_string());
                rest = &after_open[close + 1..];
            },
            _ => {
                output.push('{');
                rest = after_open;
            },
        }
    }

    output.push_str(rest);
    (output, consumed)
}

/// Render slot 7: the remaining context followed by each error chain.
///
/// Returns an empty string when nothing is left to show.
pub fn render_context_block(context: &Context) -> Result<String, LogError> {
    let mut block = String::new();

    let remaining: serde_json::Map<String, Value> = context
        .iter()
        .filter(|(key, _)| !is_reserved_error_key(key))
        .map(|(key, value)| (key.to_string(), value.to_json()))
        .collect();
    if !remaining.is_empty() {
        block.push_str(CONTEXT_PREFIX);
        block.push_str(&pretty_json(&Value::Object(remaining)));
    }

    for key in RESERVED_ERROR_KEYS {
        if let Some(value) = context.get(key) {
            block.push_str(&render_context_error(key, value)?);
        }
    }

    Ok(block)
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
