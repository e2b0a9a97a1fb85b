//! CLI binary entrypoint.

mod commands;
mod error;
mod format;

use clap::{Parser, Subcommand};
use commands::{
    EmitInput, run_config_check, run_config_schema, run_config_show, run_emit, run_info, run_sinks,
};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode, default_directive};
use logtree_facade::{ErrorKind, InfraError};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Variable holding the diagnostics filter for the CLI's own tracing output.
const LOG_FILTER_ENV: &str = "LOGTREE_LOG";

/// Prefix of the variables that override config values.
const CONFIG_ENV_PREFIX: &str = "LOGTREE_";

#[derive(Debug, Parser)]
#[command(
    name = "logtree",
    version,
    about = "Configure and exercise logtree logger trees",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show build and version details.
    Info,
    /// List the sink identifiers available to configs.
    Sinks,
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Build the configured tree and log one record through it.
    Emit {
        /// Config file path (JSON/TOML/YAML).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Optional JSON overrides (partial config).
        #[arg(long)]
        overrides_json: Option<String>,
        /// Level name; unknown names rank as debug.
        #[arg(long, default_value = "info")]
        level: String,
        /// Message text; `{key}` placeholders read from the context.
        #[arg(long, short)]
        message: String,
        /// Treat the message as a JSON value.
        #[arg(long)]
        structured: bool,
        /// Context entry as `key=value`; repeatable.
        #[arg(long = "context", short = 'c', value_name = "KEY=VALUE")]
        context: Vec<String>,
        /// Context entries as a JSON object, applied before `--context`.
        #[arg(long)]
        context_json: Option<String>,
        /// Attach an error as `Type: message` under the `exception` key.
        #[arg(long)]
        exception: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Load the config and build its tree against the built-in sinks.
    Check {
        /// Optional config file path (JSON/TOML/YAML).
        #[arg(long)]
        path: Option<PathBuf>,
        /// Optional JSON overrides (partial config).
        #[arg(long)]
        overrides_json: Option<String>,
    },
    /// Show the effective config after applying overrides.
    Show {
        /// Optional config file path (JSON/TOML/YAML).
        #[arg(long)]
        path: Option<PathBuf>,
        /// Optional JSON overrides (partial config).
        #[arg(long)]
        overrides_json: Option<String>,
    },
    /// Print the JSON Schema of the config document.
    Schema,
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.output.verbose);
    let mode = OutputMode::from_args(&cli.output);

    match run(&cli.command, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn init_tracing(verbose: u8) {
    let filter = if verbose > 0 {
        EnvFilter::new(default_directive(verbose))
    } else {
        EnvFilter::try_from_env(LOG_FILTER_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(0)))
    };
    // A subscriber may already be set when embedded in tests.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .try_init();
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(command: &Commands, mode: OutputMode) -> Result<CliOutput, CliError> {
    tracing::debug!(?command, "dispatching command");
    match command {
        Commands::Info => run_info(mode),
        Commands::Sinks => run_sinks(mode),
        Commands::Config { command } => {
            let env = collect_scoped_env(CONFIG_ENV_PREFIX);
            match command {
                ConfigCommands::Check {
                    path,
                    overrides_json,
                } => run_config_check(mode, &env, path.as_deref(), overrides_json.as_deref()),
                ConfigCommands::Show {
                    path,
                    overrides_json,
                } => run_config_show(mode, &env, path.as_deref(), overrides_json.as_deref()),
                ConfigCommands::Schema => run_config_schema(mode),
            }
        },
        Commands::Emit {
            config,
            overrides_json,
            level,
            message,
            structured,
            context,
            context_json,
            exception,
        } => {
            let input = EmitInput {
                config: config.clone(),
                overrides_json: overrides_json.clone(),
                level: level.clone(),
                message: message.clone(),
                structured: *structured,
                context: context.clone(),
                context_json: context_json.clone(),
                exception: exception.clone(),
            };
            // Sinks read host variables (remote address, color hints) too.
            let env: BTreeMap<String, String> = std::env::vars().collect();
            run_emit(mode, &env, &input)
        },
    }
}

pub(crate) fn format_error_output(
    mode: OutputMode,
    error: &InfraError,
    exit_code: ExitCode,
) -> CliOutput {
    let error = error.clone().redacted();
    let payload = error_payload(&error);

    let mut stderr = String::new();
    log_info(&mut stderr, "command failed", mode.no_progress);

    let stdout = if mode.is_ndjson() {
        format_ndjson_error(&payload)
    } else if mode.is_json() {
        let wrapped = serde_json::json!({
            "status": "error",
            "error": payload,
        });

        // This is a CLI boundary, so JSON serialization errors are internal.
        let mut output = serde_json::to_string_pretty(&wrapped).unwrap_or_else(|_| {
            "{\"status\":\"error\",\"error\":{\"code\":\"core:internal\",\"message\":\"internal error\",\"kind\":\"invariant\"}}".to_string()
        });
        output.push('\n');
        output
    } else {
        format_error_text(&error)
    };

    CliOutput {
        stdout,
        stderr,
        exit_code,
    }
}

pub(crate) fn infra_exit_code(error: &InfraError) -> ExitCode {
    if error.code.is_io() {
        return ExitCode::Io;
    }
    match error.kind {
        ErrorKind::Expected => ExitCode::InvalidInput,
        ErrorKind::Invariant | ErrorKind::Unexpected => ExitCode::Internal,
    }
}

fn error_payload(error: &InfraError) -> serde_json::Value {
    let mut payload = serde_json::json!({
        "code": error.code.to_string(),
        "message": error.message,
        "kind": error.kind.to_string(),
    });
    if !error.metadata.is_empty()
        && let Some(object) = payload.as_object_mut()
    {
        object.insert("meta".to_string(), serde_json::json!(error.metadata));
    }
    payload
}

fn format_error_text(error: &InfraError) -> String {
    let mut out = String::new();
    out.push_str("status: error\n");
    out.push_str("code: ");
    out.push_str(&error.code.to_string());
    out.push('\n');
    out.push_str("message: ");
    out.push_str(&error.message);
    out.push('\n');
    out.push_str("kind: ");
    out.push_str(&error.kind.to_string());
    out.push('\n');

    if !error.metadata.is_empty() {
        out.push_str("meta:\n");
        for (key, value) in &error.metadata {
            out.push_str("  ");
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
    }

    out
}

pub(crate) fn log_info(stderr: &mut String, message: &str, no_progress: bool) {
    if no_progress {
        return;
    }
    stderr.push_str("info: ");
    stderr.push_str(message);
    stderr.push('\n');
}

pub(crate) fn format_ndjson_summary(
    status: &str,
    kind: &str,
    extra: Option<serde_json::Value>,
) -> String {
    let mut payload = serde_json::Map::new();
    payload.insert(
        "type".to_string(),
        serde_json::Value::String("summary".to_string()),
    );
    payload.insert(
        "status".to_string(),
        serde_json::Value::String(status.to_string()),
    );
    payload.insert(
        "kind".to_string(),
        serde_json::Value::String(kind.to_string()),
    );
    if let Some(serde_json::Value::Object(map)) = extra {
        for (key, value) in map {
            payload.insert(key, value);
        }
    }
    let mut out = serde_json::to_string(&serde_json::Value::Object(payload)).unwrap_or_else(|_| {
        "{\"type\":\"summary\",\"status\":\"error\",\"kind\":\"internal\"}".to_string()
    });
    out.push('\n');
    out
}

fn format_ndjson_error(payload: &serde_json::Value) -> String {
    let wrapped = serde_json::json!({
        "type": "error",
        "status": "error",
        "error": payload,
    });
    let mut out = serde_json::to_string(&wrapped).unwrap_or_else(|_| {
        "{\"type\":\"error\",\"status\":\"error\",\"error\":{\"code\":\"core:internal\",\"message\":\"internal error\",\"kind\":\"invariant\"}}".to_string()
    });
    out.push('\n');
    out
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}

fn collect_scoped_env(prefix: &str) -> BTreeMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(prefix))
        .collect()
}
