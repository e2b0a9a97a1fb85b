//! Emit command handler.
//!
//! Builds the configured tree and logs one record through it, which makes
//! the CLI usable from shell scripts and for trying out a config.

use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{CliOutput, format_error_output, format_ndjson_summary, infra_exit_code, log_info};
use logtree_facade::{Context, EXCEPTION_KEY, ErrorInfo, Message, emit_record};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Type name used when `--exception` carries no `Type: ` prefix.
const DEFAULT_EXCEPTION_TYPE: &str = "Error";

/// Parsed arguments of the emit command.
#[derive(Debug, Clone, Default)]
pub struct EmitInput {
    pub config: Option<PathBuf>,
    pub overrides_json: Option<String>,
    pub level: String,
    pub message: String,
    pub structured: bool,
    pub context: Vec<String>,
    pub context_json: Option<String>,
    pub exception: Option<String>,
}

/// Log one record through the configured tree.
pub fn run_emit(
    mode: OutputMode,
    env: &BTreeMap<String, String>,
    input: &EmitInput,
) -> Result<CliOutput, CliError> {
    let message = build_message(&input.message, input.structured)?;
    let context = build_context(
        input.context_json.as_deref(),
        &input.context,
        input.exception.as_deref(),
    )?;

    if let Err(error) = emit_record(
        env,
        input.config.as_deref(),
        input.overrides_json.as_deref(),
        &input.level,
        message,
        context,
    ) {
        return Ok(format_error_output(mode, &error, infra_exit_code(&error)));
    }

    let mut stderr = String::new();
    log_info(&mut stderr, "record emitted", mode.no_progress);

    let stdout = if mode.is_ndjson() {
        format_ndjson_summary(
            "ok",
            "emit",
            Some(serde_json::json!({ "level": input.level })),
        )
    } else if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "level": input.level,
        });
        let mut output = serde_json::to_string_pretty(&payload)?;
        output.push('\n');
        output
    } else {
        format!("status: ok\nlevel: {}\n", input.level)
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    })
}

fn build_message(text: &str, structured: bool) -> Result<Message, CliError> {
    if !structured {
        return Ok(Message::from(text));
    }
    serde_json::from_str::<Value>(text)
        .map(Message::from)
        .map_err(|error| CliError::InvalidInput(format!("--message is not valid JSON: {error}")))
}

/// Merge `--context-json`, then each `--context key=value`, then `--exception`.
///
/// Pair values are read as JSON when they parse and as plain strings
/// otherwise, so `attempt=3` is a number and `user=ada` a string.
fn build_context(
    context_json: Option<&str>,
    pairs: &[String],
    exception: Option<&str>,
) -> Result<Context, CliError> {
    let mut entries = match context_json {
        None => Map::new(),
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(CliError::invalid_context(raw, "expected a JSON object")),
            Err(error) => return Err(CliError::invalid_context(raw, error.to_string())),
        },
    };

    for pair in pairs {
        let Some((key, raw_value)) = pair.split_once('=') else {
            return Err(CliError::invalid_context(pair, "expected key=value"));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::invalid_context(pair, "key is empty"));
        }
        let value = serde_json::from_str::<Value>(raw_value)
            .unwrap_or_else(|_| Value::String(raw_value.to_string()));
        entries.insert(key.to_string(), value);
    }

    let context = Context::from(entries);
    Ok(match exception {
        None => context,
        Some(spec) => context.with_error(EXCEPTION_KEY, parse_exception(spec)),
    })
}

fn parse_exception(spec: &str) -> ErrorInfo {
    match spec.split_once(": ") {
        Some((type_name, message)) if !type_name.trim().is_empty() => {
            ErrorInfo::new(type_name.trim(), message)
        },
        _ => ErrorInfo::new(DEFAULT_EXCEPTION_TYPE, spec),
    }
}
