//! Append-only file sink.
//!
//! The file is opened, exclusively locked, appended to, and closed on every
//! write. Construction performs no I/O.

use fs2::FileExt;
use logtree_domain::{LogRecord, SinkError, TimeFormat, TimeZone};
use logtree_ports::{Environment, Sink, SinkFactory, SinkSection};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Identifier of the file sink.
pub const FILE_SINK_TYPE: &str = "file";

/// Path used when a section sets none.
pub const DEFAULT_LOG_PATH: &str = "debug.log";

/// Appends `formatted` plus a newline to a file.
pub struct FileSink {
    path: String,
    time_label: Option<TimeFormat>,
    environment: Arc<dyn Environment>,
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("FileSink")
            .field("path", &self.path)
            .field("time_label", &self.time_label.as_ref().map(TimeFormat::as_str))
            .finish_non_exhaustive()
    }
}

impl FileSink {
    /// Sink appending to `path`.
    ///
    /// With a `time_label`, every `%s` in `path` is replaced by the current
    /// time rendered in that format, in the host's local zone.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        time_label: Option<TimeFormat>,
        environment: Arc<dyn Environment>,
    ) -> Self {
        Self {
            path: path.into(),
            time_label,
            environment,
        }
    }

    /// Path the next write goes to.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        match &self.time_label {
            Some(label) => {
                let stamp = label.format(self.environment.now(), TimeZone::Local);
                PathBuf::from(self.path.replace("%s", &stamp))
            },
            None => PathBuf::from(&self.path),
        }
    }
}

impl Sink for FileSink {
    fn write(&self, _record: &LogRecord, formatted: &str) -> Result<(), SinkError> {
        let path = self.resolved_path();
        let target = path.display().to_string();
        let io_error = |error| SinkError::io(target.clone(), error);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_error)?;
        file.lock_exclusive().map_err(io_error)?;

        let mut line = String::with_capacity(formatted.len() + 1);
        line.push_str(formatted);
        line.push('\n');
        let written = file.write_all(line.as_bytes()).and_then(|()| file.flush());
        let unlocked = FileExt::unlock(&file);
        written.map_err(io_error)?;
        unlocked.map_err(io_error)
    }
}

/// Builds [`FileSink`]s.
///
/// Options: `path` (default `debug.log`) and `timeLabel`, a time format
/// substituted for each `%s` in `path`.
#[derive(Debug, Default)]
pub struct FileSinkFactory;

impl SinkFactory for FileSinkFactory {
    fn sink_type(&self) -> &str {
        FILE_SINK_TYPE
    }

    fn build(&self, section: &SinkSection) -> Result<Box<dyn Sink>, SinkError> {
        let path = section.options.string_or("path", DEFAULT_LOG_PATH)?;
        if path.trim().is_empty() {
            return Err(SinkError::invalid_option("path", "a non-empty path"));
        }
        let time_label = section
            .options
            .string("timeLabel")?
            .map(|label| {
                TimeFormat::parse(&label)
                    .map_err(|error| SinkError::invalid_option("timeLabel", format!("a time format ({error})")))
            })
            .transpose()?;
        Ok(Box::new(FileSink::new(
            path,
            time_label,
            Arc::clone(&section.environment),
        )))
    }
}
