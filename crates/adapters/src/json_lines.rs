//! Structured JSON-lines sink.
//!
//! Emits one JSON object per record instead of the formatted text, so the
//! section's message template only affects the `formatted` field.

use crate::stream::{LineWriter, StdStream, stream_target};
use logtree_domain::{ContextValue, LogRecord, MAX_CHAIN_DEPTH, Message, SinkError, Throwable};
use logtree_ports::{Sink, SinkFactory, SinkSection, StreamTarget};
use logtree_shared::redact_json;
use serde_json::Value;
use std::sync::Arc;

/// Identifier of the JSON-lines sink.
pub const JSON_SINK_TYPE: &str = "json";

/// Writes one redacted JSON object per record.
#[derive(Debug)]
pub struct JsonLinesSink {
    writer: Arc<dyn LineWriter>,
    include_formatted: bool,
}

impl JsonLinesSink {
    /// JSON-lines sink over `writer`.
    #[must_use]
    pub fn new(writer: Arc<dyn LineWriter>) -> Self {
        Self {
            writer,
            include_formatted: false,
        }
    }

    /// Also emit the formatted text under `formatted`.
    #[must_use]
    pub const fn with_formatted(mut self, include: bool) -> Self {
        self.include_formatted = include;
        self
    }

    fn payload(&self, record: &LogRecord, formatted: &str) -> Value {
        let mut payload = serde_json::Map::new();
        payload.insert(
            "timestamp".to_string(),
            Value::String(record.timestamp().to_rfc3339()),
        );
        payload.insert("level".to_string(), Value::String(record.level().to_string()));
        payload.insert(
            "severity".to_string(),
            Value::String(record.severity().as_str().to_string()),
        );
        let message = match record.message() {
            Message::Text(text) => Value::String(text.clone()),
            Message::Structured(value) => redact_json(value.clone()),
        };
        payload.insert("message".to_string(), message);

        if !record.context().is_empty() {
            let context: serde_json::Map<String, Value> = record
                .context()
                .iter()
                .map(|(key, value)| (key.to_string(), context_json(value)))
                .collect();
            payload.insert("context".to_string(), redact_json(Value::Object(context)));
        }
        if self.include_formatted {
            payload.insert("formatted".to_string(), Value::String(formatted.to_string()));
        }
        Value::Object(payload)
    }
}

fn context_json(value: &ContextValue) -> Value {
    match value {
        ContextValue::Value(value) => value.clone(),
        ContextValue::Error(error) => throwable_json(error.as_ref()),
    }
}

/// Error chain as nested `{typeName, message, location?, previous?}` objects.
fn throwable_json(error: &dyn Throwable) -> Value {
    let mut links = Vec::new();
    let mut current = Some(error);
    while let Some(link) = current {
        if links.len() == MAX_CHAIN_DEPTH {
            break;
        }
        links.push(link);
        current = link.previous();
    }

    links.into_iter().rev().fold(Value::Null, |previous, link| {
        let mut object = serde_json::Map::new();
        object.insert("typeName".to_string(), Value::String(link.type_name().to_string()));
        object.insert("message".to_string(), Value::String(link.message().to_string()));
        if let Some(location) = link.location() {
            object.insert("location".to_string(), Value::String(location.to_string()));
        }
        if !previous.is_null() {
            object.insert("previous".to_string(), previous);
        }
        Value::Object(object)
    })
}

impl Sink for JsonLinesSink {
    fn write(&self, record: &LogRecord, formatted: &str) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(&self.payload(record, formatted)).map_err(|error| {
            SinkError::Transport {
                transport: JSON_SINK_TYPE.to_string(),
                reason: format!("serialization failed: {error}"),
            }
        })?;
        line.push('\n');
        self.writer
            .write_line(&line)
            .map_err(|error| SinkError::io(self.writer.name(), error))
    }
}

/// Builds [`JsonLinesSink`]s.
///
/// Options: `stream` (`stderr`|`stdout`, default `stdout`) and
/// `includeFormatted` (bool, default false).
#[derive(Debug, Default)]
pub struct JsonLinesSinkFactory;

impl SinkFactory for JsonLinesSinkFactory {
    fn sink_type(&self) -> &str {
        JSON_SINK_TYPE
    }

    fn build(&self, section: &SinkSection) -> Result<Box<dyn Sink>, SinkError> {
        let stream = stream_target(section.options.choice(
            "stream",
            &[StreamTarget::Stderr.as_str(), StreamTarget::Stdout.as_str()],
            StreamTarget::Stdout.as_str(),
        )?);
        let include_formatted = match section.options.get("includeFormatted") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(_) => return Err(SinkError::invalid_option("includeFormatted", "a boolean")),
        };
        Ok(Box::new(
            JsonLinesSink::new(Arc::new(StdStream(stream))).with_formatted(include_formatted),
        ))
    }
}
