//! # logtree-testkit
//!
//! Recording sinks, failing sinks, and a fixed environment for testing the
//! logger tree end to end. This crate depends on `ports`, `domain`, and
//! `shared`; it never depends on the engine itself.

pub mod environment;
pub mod errors;
pub mod recording;

pub use environment::{FIXED_ADDRESS, FIXED_SESSION, FixedEnvironment, fixed_instant};
pub use errors::{ChainedError, error_chain, nested_error};
pub use recording::{FailingSink, FailingSinkFactory, Journal, JournalEntry, RecordingSink, RecordingSinkFactory};

/// Returns the testkit crate version.
#[must_use]
pub const fn testkit_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtree_ports::ports_crate_version;
    use logtree_shared::shared_crate_version;

    #[test]
    fn testkit_crate_compiles() {
        let version = testkit_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn testkit_can_use_ports_and_shared() {
        let ports_version = ports_crate_version();
        let shared_version = shared_crate_version();

        assert!(!ports_version.is_empty());
        assert!(!shared_version.is_empty());
    }

    #[test]
    fn fixtures_are_available() {
        let journal = Journal::default();
        assert!(journal.is_empty());
        assert_eq!(error_chain(3).to_string(), "Level0Error: failure at level 0");
    }
}
