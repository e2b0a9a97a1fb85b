//! Deterministic [`Environment`] for tests.

use chrono::{DateTime, TimeZone, Utc};
use logtree_ports::{Environment, StreamTarget};

/// Session id reported by [`FixedEnvironment::default`].
pub const FIXED_SESSION: &str = "sess-0001";

/// Remote address reported by [`FixedEnvironment::default`].
pub const FIXED_ADDRESS: &str = "192.0.2.10";

/// 2024-03-05 06:07:08 UTC.
pub fn fixed_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 6, 7, 8)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Environment with a frozen clock and fixed identity.
#[derive(Debug, Clone)]
pub struct FixedEnvironment {
    now: DateTime<Utc>,
    session_id: Option<String>,
    remote_address: Option<String>,
    color: bool,
}

impl Default for FixedEnvironment {
    fn default() -> Self {
        Self {
            now: fixed_instant(),
            session_id: Some(FIXED_SESSION.to_string()),
            remote_address: Some(FIXED_ADDRESS.to_string()),
            color: false,
        }
    }
}

impl FixedEnvironment {
    /// Environment with no session and no remote peer.
    pub fn anonymous() -> Self {
        Self {
            session_id: None,
            remote_address: None,
            ..Self::default()
        }
    }

    /// Freeze the clock at `now`.
    #[must_use]
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Report every stream as color capable.
    #[must_use]
    pub fn with_color(mut self) -> Self {
        self.color = true;
        self
    }
}

impl Environment for FixedEnvironment {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn session_id(&self) -> Option<String> {
        self.session_id.clone()
    }

    fn remote_address(&self) -> Option<String> {
        self.remote_address.clone()
    }

    fn supports_color(&self, _stream: StreamTarget) -> bool {
        self.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_stable() {
        let env = FixedEnvironment::default();
        assert_eq!(env.now(), fixed_instant());
        assert_eq!(env.session_id().as_deref(), Some(FIXED_SESSION));
        assert!(!env.supports_color(StreamTarget::Stderr));
        assert!(FixedEnvironment::anonymous().remote_address().is_none());
        assert!(FixedEnvironment::default().with_color().supports_color(StreamTarget::Stdout));
    }
}
