//! Process environment collaborator.

use chrono::{DateTime, Utc};

/// Output stream a sink writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamTarget {
    /// Standard error.
    Stderr,
    /// Standard output.
    Stdout,
}

impl StreamTarget {
    /// Config name of the stream.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stderr => "stderr",
            Self::Stdout => "stdout",
        }
    }
}

/// Clock, identity, and terminal introspection used while formatting.
///
/// Values are opaque to the engine; `None` renders as an empty field.
pub trait Environment: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Per-process or per-session identifier.
    fn session_id(&self) -> Option<String>;

    /// Address of the remote peer driving this process, if any.
    fn remote_address(&self) -> Option<String>;

    /// Whether `stream` can render ANSI colors.
    fn supports_color(&self, _stream: StreamTarget) -> bool {
        false
    }
}
