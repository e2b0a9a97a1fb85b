//! CLI E2E smoke tests.

use std::io;
use std::process::Command;

fn run_json(args: &[&str]) -> io::Result<serde_json::Value> {
    let output = Command::new(env!("CARGO_BIN_EXE_logtree"))
        .args(["--output", "json"])
        .args(args)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(io::Error::other(format!("{args:?} failed: {stderr}")));
    }

    serde_json::from_slice(&output.stdout).map_err(io::Error::other)
}

#[test]
fn info_is_deterministic() -> io::Result<()> {
    let first = run_json(&["info"])?;
    let second = run_json(&["info"])?;

    assert_eq!(first, second, "info output should be deterministic");
    assert_eq!(first["status"], "ok");
    assert_eq!(first["build"]["name"], "logtree-cli");

    Ok(())
}

#[test]
fn info_lists_levels_in_rank_order() -> io::Result<()> {
    let value = run_json(&["info"])?;
    assert_eq!(
        value["build"]["levels"],
        serde_json::json!([
            "debug", "info", "notice", "warning", "error", "critical", "alert", "emergency"
        ])
    );

    Ok(())
}

#[test]
fn sinks_lists_builtin_types() -> io::Result<()> {
    let value = run_json(&["sinks"])?;
    assert_eq!(
        value["sinkTypes"],
        serde_json::json!(["aggregate", "console", "file", "json", "mail", "null"])
    );

    Ok(())
}

#[test]
fn ndjson_output_is_a_single_summary_line() -> io::Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_logtree"))
        .args(["--output", "ndjson", "sinks"])
        .output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);

    let value: serde_json::Value = serde_json::from_str(lines[0]).map_err(io::Error::other)?;
    assert_eq!(value["type"], "summary");
    assert_eq!(value["kind"], "sinks");
    assert!(output.stderr.is_empty());

    Ok(())
}
