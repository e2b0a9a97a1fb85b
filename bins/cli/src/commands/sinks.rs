//! Sinks command handler.

use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{CliOutput, format_ndjson_summary};
use logtree_facade::registered_sink_types;

/// List the sink identifiers the built-in registry resolves.
pub fn run_sinks(mode: OutputMode) -> Result<CliOutput, CliError> {
    let sink_types = registered_sink_types();

    let stdout = if mode.is_ndjson() {
        format_ndjson_summary(
            "ok",
            "sinks",
            Some(serde_json::json!({ "sinkTypes": sink_types })),
        )
    } else if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "sinkTypes": sink_types,
        });
        let mut output = serde_json::to_string_pretty(&payload)?;
        output.push('\n');
        output
    } else {
        let mut out = String::from("status: ok\nsinks:\n");
        for sink_type in &sink_types {
            out.push_str("  - ");
            out.push_str(sink_type);
            out.push('\n');
        }
        out
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}
