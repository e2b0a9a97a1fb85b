//! Emit E2E tests: config in, formatted records out.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(label: &str) -> io::Result<PathBuf> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(io::Error::other)?
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("logtree-e2e-{label}-{nanos}"));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn file_overrides(log_path: &Path, min_level: &str) -> String {
    serde_json::json!({
        "children": [
            {
                "sink": "file",
                "path": log_path.to_string_lossy(),
                "minLevel": min_level,
                "messageFormat": "%5$s %6$s%7$s"
            }
        ]
    })
    .to_string()
}

fn emit(overrides: &str, args: &[&str]) -> io::Result<Output> {
    let mut command = Command::new(env!("CARGO_BIN_EXE_logtree"));
    for (key, _) in std::env::vars() {
        if key.starts_with("LOGTREE_") {
            command.env_remove(key);
        }
    }
    command
        .args(["emit", "--overrides-json", overrides])
        .args(args)
        .output()
}

#[test]
fn emit_writes_interpolated_record_to_file() -> io::Result<()> {
    let dir = temp_dir("interpolate")?;
    let log_path = dir.join("app.log");
    let overrides = file_overrides(&log_path, "debug");

    let output = emit(
        &overrides,
        &["--level", "warning", "-m", "user {id} failed", "-c", "id=42", "-c", "attempt=3"],
    )?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "emit failed: {stderr}");

    let written = std::fs::read_to_string(&log_path)?;
    assert_eq!(
        written,
        "WARNING user 42 failed\nContext: {\n  \"attempt\": 3\n}\n"
    );

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn emit_renders_exception_block() -> io::Result<()> {
    let dir = temp_dir("exception")?;
    let log_path = dir.join("errors.log");
    let overrides = file_overrides(&log_path, "error");

    let output = emit(
        &overrides,
        &["--level", "error", "-m", "save failed", "--exception", "IoError: disk full"],
    )?;
    assert!(output.status.success());

    let written = std::fs::read_to_string(&log_path)?;
    assert!(written.starts_with("ERROR save failed\nIoError: disk full\n\nStack trace:"));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn records_below_the_range_are_not_written() -> io::Result<()> {
    let dir = temp_dir("filtered")?;
    let log_path = dir.join("filtered.log");
    let overrides = file_overrides(&log_path, "error");

    let output = emit(&overrides, &["--level", "info", "-m", "quiet"])?;
    assert!(output.status.success());
    assert!(!log_path.exists());

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn repeated_emits_append() -> io::Result<()> {
    let dir = temp_dir("append")?;
    let log_path = dir.join("append.log");
    let overrides = file_overrides(&log_path, "debug");

    for message in ["one", "two"] {
        let output = emit(&overrides, &["-m", message])?;
        assert!(output.status.success());
    }

    let written = std::fs::read_to_string(&log_path)?;
    assert_eq!(written, "INFO one\nINFO two\n");

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn unknown_sink_exits_with_invalid_input() -> io::Result<()> {
    let output = emit(r#"{"children": [{"sink": "syslog"}]}"#, &["-m", "lost"])?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout.contains("code: logger:unknown_sink_type"));

    Ok(())
}

#[test]
fn plain_value_under_exception_key_is_rejected() -> io::Result<()> {
    let output = emit(
        r#"{"children": [{"sink": "null"}]}"#,
        &["-m", "bad", "--context-json", r#"{"exception": "text"}"#],
    )?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout.contains("code: logger:invalid_context"));

    Ok(())
}

#[test]
fn malformed_context_pair_is_a_usage_error() -> io::Result<()> {
    let output = emit(r#"{"children": [{"sink": "null"}]}"#, &["-m", "x", "-c", "novalue"])?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("invalid context argument"));

    Ok(())
}
