//! Contract-style tests for the sink ports using the recording adapters.

use logtree_domain::{Context, LogRecord, SinkError};
use logtree_ports::{SINK_CONTRACT_VERSION, SinkFactory, SinkOptions, SinkSection};
use logtree_shared::{ErrorCode, ErrorEnvelope};
use logtree_testkit::{FailingSinkFactory, FixedEnvironment, Journal, RecordingSinkFactory, fixed_instant};
use std::sync::Arc;

fn section(path: &str) -> SinkSection {
    SinkSection {
        path: path.to_string(),
        options: SinkOptions::default(),
        environment: Arc::new(FixedEnvironment::default()),
    }
}

#[test]
fn recording_factory_honours_the_contract() -> Result<(), Box<dyn std::error::Error>> {
    let journal = Journal::default();
    let factory = RecordingSinkFactory::new("recording", journal.clone()).with_default_format("%6$s");

    assert_eq!(factory.sink_type(), "recording");
    assert_eq!(factory.contract_version(), SINK_CONTRACT_VERSION);
    assert_eq!(factory.default_message_format(), Some("%6$s"));

    let sink = factory.build(&section("root"))?;
    let record = LogRecord::new("NOTICE", "ready", Context::new(), fixed_instant())?;
    sink.write(&record, "ready")?;

    let entries = journal.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, "NOTICE");
    assert_eq!(entries[0].label, "root");
    Ok(())
}

#[test]
fn overridden_contract_version_is_reported() {
    let factory = RecordingSinkFactory::new("legacy", Journal::default())
        .with_contract_version(SINK_CONTRACT_VERSION + 1);
    assert_ne!(factory.contract_version(), SINK_CONTRACT_VERSION);
}

#[test]
fn sink_failures_convert_to_envelopes() -> Result<(), Box<dyn std::error::Error>> {
    let sink = FailingSinkFactory::default().build(&section("children[0]"))?;
    let record = LogRecord::new("error", "boom", Context::new(), fixed_instant())?;

    let error = match sink.write(&record, "boom") {
        Err(error) => error,
        Ok(()) => return Err("failing sink accepted a write".into()),
    };
    assert!(matches!(error, SinkError::Transport { .. }));

    let envelope = ErrorEnvelope::from(error);
    assert_eq!(envelope.code, ErrorCode::sink("transport"));
    assert_eq!(
        envelope.metadata.get("transport").map(String::as_str),
        Some("children[0]")
    );
    Ok(())
}

#[test]
fn invalid_label_option_is_rejected() {
    let factory = RecordingSinkFactory::new("recording", Journal::default());
    let mut bad = section("root");
    bad.options = SinkOptions::default().with("label", 5);
    assert!(matches!(
        factory.build(&bad),
        Err(SinkError::InvalidOption { ref key, .. }) if key == "label"
    ));
}
