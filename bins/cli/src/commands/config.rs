//! Config command handlers.

use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use crate::{CliOutput, format_error_output, format_ndjson_summary, infra_exit_code, log_info};
use logtree_facade::{
    check_config_with_defaults, load_effective_config_json, logging_config_schema_json,
};
use std::collections::BTreeMap;
use std::path::Path;

fn path_json(path: Option<&Path>) -> Option<String> {
    path.map(|value| value.to_string_lossy().to_string())
}

/// Load the config, build its tree against the built-in sinks, and report.
pub fn run_config_check(
    mode: OutputMode,
    env: &BTreeMap<String, String>,
    path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<CliOutput, CliError> {
    let report = match check_config_with_defaults(env, path, overrides_json) {
        Ok(report) => report,
        Err(error) => return Ok(format_error_output(mode, &error, infra_exit_code(&error))),
    };

    let mut stderr = String::new();
    log_info(&mut stderr, "config check completed", mode.no_progress);

    let stdout = if mode.is_ndjson() {
        format_ndjson_summary("ok", "config", Some(serde_json::to_value(&report)?))
    } else if mode.is_json() {
        let payload = serde_json::json!({
            "status": "ok",
            "configPath": path_json(path),
            "report": report,
        });
        let mut output = serde_json::to_string_pretty(&payload)?;
        output.push('\n');
        output
    } else {
        let mut out = String::from("status: ok\nconfig: ok\n");
        if let Some(path) = path {
            out.push_str("path: ");
            out.push_str(&path.to_string_lossy());
            out.push('\n');
        }
        out.push_str(&format!(
            "sections: {}\nnodes: {}\nsinks: {}\n",
            report.section_count,
            report.node_count,
            report.sink_types.join(", ")
        ));
        out
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    })
}

/// Print the effective config after env and JSON overrides.
pub fn run_config_show(
    mode: OutputMode,
    env: &BTreeMap<String, String>,
    path: Option<&Path>,
    overrides_json: Option<&str>,
) -> Result<CliOutput, CliError> {
    let config_json = match load_effective_config_json(env, path, overrides_json) {
        Ok(config) => config,
        Err(error) => return Ok(format_error_output(mode, &error, infra_exit_code(&error))),
    };

    let mut stderr = String::new();
    log_info(&mut stderr, "config show completed", mode.no_progress);

    let stdout = if mode.is_ndjson() || mode.is_json() {
        let config_value: serde_json::Value = serde_json::from_str(config_json.trim())?;
        if mode.is_ndjson() {
            format_ndjson_summary(
                "ok",
                "config",
                Some(serde_json::json!({ "effectiveConfig": config_value })),
            )
        } else {
            let payload = serde_json::json!({
                "status": "ok",
                "configPath": path_json(path),
                "effectiveConfig": config_value,
            });
            let mut output = serde_json::to_string_pretty(&payload)?;
            output.push('\n');
            output
        }
    } else {
        let mut out = String::from("status: ok\nconfig:\n");
        out.push_str(&config_json);
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    };

    Ok(CliOutput {
        stdout,
        stderr,
        exit_code: ExitCode::Ok,
    })
}

/// Print the JSON Schema of the config document.
pub fn run_config_schema(mode: OutputMode) -> Result<CliOutput, CliError> {
    let schema = match logging_config_schema_json() {
        Ok(schema) => schema,
        Err(error) => return Ok(format_error_output(mode, &error, infra_exit_code(&error))),
    };

    let stdout = if mode.is_ndjson() {
        let schema_value: serde_json::Value = serde_json::from_str(&schema)?;
        format_ndjson_summary(
            "ok",
            "schema",
            Some(serde_json::json!({ "schema": schema_value })),
        )
    } else {
        let mut output = schema;
        output.push('\n');
        output
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}
