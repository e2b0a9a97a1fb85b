//! Info command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::OutputMode;
use logtree_facade::{Severity, facade_crate_version};

/// Build details reported by `info`.
struct BuildInfo {
    name: &'static str,
    version: &'static str,
    facade_version: &'static str,
}

impl BuildInfo {
    const fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            facade_version: facade_crate_version(),
        }
    }
}

/// Run the info command.
pub fn run_info(mode: OutputMode) -> Result<CliOutput, CliError> {
    let build = BuildInfo::current();
    let levels: Vec<&str> = Severity::ALL.iter().map(|level| level.as_str()).collect();

    let stdout = if mode.is_ndjson() {
        format_info_ndjson(&build, &levels)?
    } else if mode.is_json() {
        format_info_json(&build, &levels)?
    } else {
        format_info_text(&build, &levels)
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

fn format_info_text(build: &BuildInfo, levels: &[&str]) -> String {
    format!(
        "status: ok\nname: {}\nversion: {}\nfacade: {}\nlevels: {}\n",
        build.name,
        build.version,
        build.facade_version,
        levels.join(", ")
    )
}

fn build_json(build: &BuildInfo, levels: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "name": build.name,
        "version": build.version,
        "facadeVersion": build.facade_version,
        "levels": levels,
    })
}

fn format_info_json(build: &BuildInfo, levels: &[&str]) -> Result<String, CliError> {
    let payload = serde_json::json!({
        "status": "ok",
        "build": build_json(build, levels),
    });
    let mut output = serde_json::to_string_pretty(&payload)?;
    output.push('\n');
    Ok(output)
}

fn format_info_ndjson(build: &BuildInfo, levels: &[&str]) -> Result<String, CliError> {
    let payload = serde_json::json!({
        "type": "summary",
        "status": "ok",
        "kind": "info",
        "build": build_json(build, levels),
    });
    let mut output = serde_json::to_string(&payload)?;
    output.push('\n');
    Ok(output)
}
