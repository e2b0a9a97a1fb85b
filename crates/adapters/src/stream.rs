//! Line-oriented output streams for console-like sinks.

use logtree_ports::StreamTarget;
use std::fmt;
use std::io::{self, Write};

/// Destination that receives whole lines.
pub trait LineWriter: Send + Sync + fmt::Debug {
    /// Write `line` as-is; callers append the newline.
    fn write_line(&self, line: &str) -> io::Result<()>;

    /// Name used in error reports.
    fn name(&self) -> &str;
}

/// Process standard stream.
#[derive(Debug, Clone, Copy)]
pub struct StdStream(pub StreamTarget);

impl LineWriter for StdStream {
    fn write_line(&self, line: &str) -> io::Result<()> {
        match self.0 {
            StreamTarget::Stderr => {
                let mut stderr = io::stderr().lock();
                stderr.write_all(line.as_bytes())?;
                stderr.flush()
            },
            StreamTarget::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(line.as_bytes())?;
                stdout.flush()
            },
        }
    }

    fn name(&self) -> &str {
        self.0.as_str()
    }
}

/// Parse a `stream` option value.
pub(crate) fn stream_target(name: &str) -> StreamTarget {
    if name == StreamTarget::Stdout.as_str() {
        StreamTarget::Stdout
    } else {
        StreamTarget::Stderr
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use super::LineWriter;
    use std::io;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    pub struct MemoryWriter {
        lines: Mutex<Vec<String>>,
    }

    impl MemoryWriter {
        pub fn take(&self) -> Vec<String> {
            self.lines
                .lock()
                .map(|mut guard| std::mem::take(&mut *guard))
                .unwrap_or_default()
        }
    }

    impl LineWriter for MemoryWriter {
        fn write_line(&self, line: &str) -> io::Result<()> {
            let mut guard = self.lines
                .lock()
                .map_err(|_| io::Error::other("memory writer poisoned"))?;
            guard.push(line.to_string());
            Ok(())
        }

        fn name(&self) -> &str {
            "memory"
        }
    }
}
