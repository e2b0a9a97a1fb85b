//! Panic hook installation; kept in its own test binary because the hook is
//! process-global.

use logtree_app::SinkRegistry;
use logtree_config::parse_logging_config_json;
use logtree_infra::{HookInstall, LoggingRuntime, PANIC_MESSAGE};
use logtree_ports::Environment;
use logtree_testkit::{FixedEnvironment, Journal, RecordingSinkFactory};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

static PREVIOUS_HOOK_RAN: AtomicBool = AtomicBool::new(false);

#[test]
#[allow(clippy::panic, reason = "the hook under test needs a real panic")]
fn panics_are_logged_once_and_chain_to_previous_hook() -> Result<(), Box<dyn std::error::Error>> {
    let journal = Journal::default();
    let registry = SinkRegistry::new().with(Arc::new(RecordingSinkFactory::new("recording", journal.clone())));
    let config = parse_logging_config_json(
        &json!({
            "children": [{
                "sink": "recording",
                "label": "panics",
                "minLevel": "critical",
                "messageFormat": "%5$s %6$s%7$s"
            }]
        })
        .to_string(),
    )?;
    let environment: Arc<dyn Environment> = Arc::new(FixedEnvironment::default());
    let runtime = LoggingRuntime::new(&config, &registry, environment)?;

    std::panic::set_hook(Box::new(|_| PREVIOUS_HOOK_RAN.store(true, Ordering::SeqCst)));

    assert!(!LoggingRuntime::panic_hook_installed());
    assert_eq!(runtime.install_panic_hook(), HookInstall::Installed);
    assert_eq!(runtime.install_panic_hook(), HookInstall::AlreadyInstalled);
    assert!(LoggingRuntime::panic_hook_installed());

    let outcome = std::panic::catch_unwind(|| {
        panic!("worker exploded");
    });
    assert!(outcome.is_err());
    assert!(PREVIOUS_HOOK_RAN.load(Ordering::SeqCst), "hook in place before install must still run");

    let written = journal.formatted_for("panics");
    assert_eq!(written.len(), 1, "hook must run exactly once per panic");
    assert!(written[0].starts_with(&format!("CRITICAL {PANIC_MESSAGE}")));
    assert!(written[0].contains("\npanic: worker exploded in "));
    assert!(written[0].contains("panic_hook.rs:"));
    assert!(written[0].contains("\n\nStack trace:\n\n"));
    Ok(())
}
