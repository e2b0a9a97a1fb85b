//! Host process [`Environment`].

use logtree_ports::{Environment, StreamTarget};
use std::io::IsTerminal;
use uuid::Uuid;

/// Variables consulted, in order, for the remote peer address.
pub const REMOTE_ADDRESS_VARS: [&str; 3] = ["REMOTE_ADDR", "SSH_CLIENT", "SSH_CONNECTION"];

/// Environment backed by the running process.
///
/// The session id is generated once per instance. The remote address is
/// read from [`REMOTE_ADDRESS_VARS`] at construction; for the SSH variables
/// only the first field (the client address) is kept.
#[derive(Debug, Clone)]
pub struct ProcessEnvironment {
    session_id: String,
    remote_address: Option<String>,
    no_color: bool,
    term: Option<String>,
}

impl ProcessEnvironment {
    /// Snapshot the current process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an explicit variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let remote_address = REMOTE_ADDRESS_VARS.iter().find_map(|name| {
            lookup(name)
                .and_then(|value| value.split_whitespace().next().map(str::to_string))
                .filter(|value| !value.is_empty())
        });
        Self {
            session_id: Uuid::new_v4().to_string(),
            remote_address,
            no_color: lookup("NO_COLOR").is_some_and(|value| !value.is_empty()),
            term: lookup("TERM"),
        }
    }

    fn term_is_xterm(&self) -> bool {
        self.term
            .as_deref()
            .is_some_and(|term| term.to_ascii_lowercase().contains("xterm"))
    }
}

impl Default for ProcessEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for ProcessEnvironment {
    fn session_id(&self) -> Option<String> {
        Some(self.session_id.clone())
    }

    fn remote_address(&self) -> Option<String> {
        self.remote_address.clone()
    }

    fn supports_color(&self, stream: StreamTarget) -> bool {
        if self.no_color {
            return false;
        }
        let terminal = match stream {
            StreamTarget::Stderr => std::io::stderr().is_terminal(),
            StreamTarget::Stdout => std::io::stdout().is_terminal(),
        };
        terminal || self.term_is_xterm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&str, &str)]) -> ProcessEnvironment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        ProcessEnvironment::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn ssh_client_address_is_first_field() {
        let env = from_map(&[("SSH_CLIENT", "203.0.113.9 52144 22")]);
        assert_eq!(env.remote_address().as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn remote_addr_wins_over_ssh() {
        let env = from_map(&[("REMOTE_ADDR", "198.51.100.4"), ("SSH_CLIENT", "203.0.113.9 1 22")]);
        assert_eq!(env.remote_address().as_deref(), Some("198.51.100.4"));
        assert!(from_map(&[]).remote_address().is_none());
    }

    #[test]
    fn session_ids_are_unique_per_instance() {
        let first = from_map(&[]).session_id();
        let second = from_map(&[]).session_id();
        assert!(first.is_some());
        assert_ne!(first, second);
    }

    #[test]
    fn no_color_disables_and_xterm_enables() {
        let muted = from_map(&[("NO_COLOR", "1"), ("TERM", "xterm-256color")]);
        assert!(!muted.supports_color(StreamTarget::Stderr));

        let xterm = from_map(&[("TERM", "xterm-256color")]);
        assert!(xterm.supports_color(StreamTarget::Stdout));
    }
}
