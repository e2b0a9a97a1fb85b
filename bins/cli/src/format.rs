//! Output format helpers for CLI commands.

use clap::{ArgAction, Args, ValueEnum};

/// Output format choices for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-friendly text output.
    Text,
    /// Machine-friendly JSON output.
    Json,
    /// Line-delimited JSON (NDJSON) output.
    Ndjson,
}

/// Output-related CLI flags.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Output format for command responses.
    #[arg(long, global = true, value_enum)]
    pub output: Option<OutputFormat>,
    /// Suppress progress output on stderr.
    #[arg(long, global = true)]
    pub no_progress: bool,
    /// Raise internal diagnostics (`-v` debug, `-vv` trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Output mode derived from CLI flags.
#[derive(Debug, Clone, Copy)]
pub struct OutputMode {
    pub format: OutputFormat,
    pub no_progress: bool,
}

impl OutputMode {
    /// Build output mode from CLI flags.
    #[must_use]
    pub fn from_args(args: &OutputArgs) -> Self {
        let format = args.output.unwrap_or(OutputFormat::Text);
        // Machine output never interleaves progress lines.
        let no_progress = args.no_progress || format == OutputFormat::Ndjson;
        Self {
            format,
            no_progress,
        }
    }

    /// Returns true when JSON output is requested.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Returns true when NDJSON output is requested.
    #[must_use]
    pub const fn is_ndjson(self) -> bool {
        matches!(self.format, OutputFormat::Ndjson)
    }
}

/// Default diagnostics filter for a `--verbose` count.
#[must_use]
pub const fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(output: Option<OutputFormat>, no_progress: bool) -> OutputArgs {
        OutputArgs {
            output,
            no_progress,
            verbose: 0,
        }
    }

    #[test]
    fn text_is_the_default() {
        let mode = OutputMode::from_args(&args(None, false));
        assert_eq!(mode.format, OutputFormat::Text);
        assert!(!mode.no_progress);
    }

    #[test]
    fn ndjson_silences_progress() {
        let mode = OutputMode::from_args(&args(Some(OutputFormat::Ndjson), false));
        assert!(mode.is_ndjson());
        assert!(mode.no_progress);
    }

    #[test]
    fn verbosity_maps_to_directives() {
        assert_eq!(default_directive(0), "warn");
        assert_eq!(default_directive(1), "debug");
        assert_eq!(default_directive(5), "trace");
    }
}
