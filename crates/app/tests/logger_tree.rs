//! Logger trees built from config documents and driven end to end.

use logtree_app::{CHAIN_SEPARATOR, Logger, SinkRegistry, TRUNCATION_MARKER};
use logtree_config::parse_logging_config_json;
use logtree_domain::{Context, EXCEPTION_KEY, LogError, MAX_CHAIN_DEPTH, Severity};
use logtree_ports::SinkFactory;
use logtree_testkit::{
    FailingSinkFactory, FixedEnvironment, Journal, RecordingSinkFactory, error_chain, nested_error,
};
use serde_json::json;
use std::error::Error;
use std::sync::Arc;

fn registry(journal: &Journal) -> (SinkRegistry, Arc<RecordingSinkFactory>) {
    let recording = Arc::new(RecordingSinkFactory::new("recording", journal.clone()));
    let registry = SinkRegistry::new()
        .with(Arc::clone(&recording) as Arc<dyn SinkFactory>)
        .with(Arc::new(FailingSinkFactory::new(journal.clone())));
    (registry, recording)
}

fn logger(document: &serde_json::Value, journal: &Journal) -> Result<Logger, Box<dyn Error>> {
    let config = parse_logging_config_json(&document.to_string())?;
    let (registry, _) = registry(journal);
    Ok(Logger::build(
        &config,
        &registry,
        Arc::new(FixedEnvironment::default()),
    )?)
}

#[test]
fn records_reach_accepting_nodes_in_declared_order() -> Result<(), Box<dyn Error>> {
    let journal = Journal::default();
    let logger = logger(
        &json!({
            "children": [
                {"sink": "recording", "label": "all", "messageFormat": "%6$s"},
                {"sink": "aggregate", "minLevel": "warning", "children": [
                    {"sink": "recording", "label": "loud", "messageFormat": "%6$s"},
                    {"sink": "recording", "label": "bounded", "maxLevel": "error", "messageFormat": "%6$s"}
                ]},
                {"sink": "recording", "label": "paging", "minLevel": "critical", "messageFormat": "%6$s"}
            ]
        }),
        &journal,
    )?;

    logger.info("routine", Context::new())?;
    assert_eq!(journal.labels(), vec!["all"]);
    journal.clear();

    logger.warning("disk at 90%", Context::new())?;
    assert_eq!(journal.labels(), vec!["all", "loud", "bounded"]);
    journal.clear();

    logger.emergency("disk full", Context::new())?;
    assert_eq!(journal.labels(), vec!["all", "loud", "paging"]);
    Ok(())
}

#[test]
fn unknown_levels_rank_as_debug_and_keep_their_label() -> Result<(), Box<dyn Error>> {
    let journal = Journal::default();
    let logger = logger(
        &json!({"children": [
            {"sink": "recording", "label": "debug", "maxLevel": "debug", "messageFormat": "%5$s %6$s"},
            {"sink": "recording", "label": "info", "minLevel": "info", "messageFormat": "%5$s %6$s"}
        ]}),
        &journal,
    )?;

    logger.log("Trace", "deep detail", Context::new())?;
    let entries = journal.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].label, "debug");
    assert_eq!(entries[0].severity, Severity::Debug);
    assert_eq!(entries[0].formatted, "TRACE deep detail");
    Ok(())
}

#[test]
fn default_template_uses_environment_fields() -> Result<(), Box<dyn Error>> {
    let journal = Journal::default();
    let logger = logger(
        &json!({"children": [{"sink": "recording", "label": "out", "processName": "api"}]}),
        &journal,
    )?;

    logger.notice("ready", Context::new())?;
    assert_eq!(
        journal.formatted_for("out"),
        vec!["2024-03-05 06:07:08.000000 UTC api [sess-0001] [192.0.2.10] [NOTICE] ready"]
    );
    Ok(())
}

#[test]
fn factory_default_format_applies_when_section_has_none() -> Result<(), Box<dyn Error>> {
    let journal = Journal::default();
    let factory = RecordingSinkFactory::new("tagged", journal.clone()).with_default_format("<%5$s> %6$s");
    let registry = SinkRegistry::new().with(Arc::new(factory));
    let config = parse_logging_config_json(
        &json!({"children": [
            {"sink": "tagged", "label": "defaulted"},
            {"sink": "tagged", "label": "explicit", "messageFormat": "%6$s!"}
        ]})
        .to_string(),
    )?;
    let logger = Logger::build(&config, &registry, Arc::new(FixedEnvironment::default()))?;

    logger.error("boom", Context::new())?;
    assert_eq!(journal.formatted(), vec!["<ERROR> boom", "boom!"]);
    Ok(())
}

#[test]
fn unknown_sink_type_fails_before_any_sink_is_built() -> Result<(), Box<dyn Error>> {
    let journal = Journal::default();
    let (registry, recording) = registry(&journal);
    let config = parse_logging_config_json(
        &json!({"children": [
            {"sink": "recording"},
            {"sink": "aggregate", "children": [{"sink": "syslog"}]}
        ]})
        .to_string(),
    )?;

    let result = Logger::build(&config, &registry, Arc::new(FixedEnvironment::default()));
    assert!(matches!(
        result,
        Err(LogError::UnknownSinkType { ref sink_type, ref path })
            if sink_type == "syslog" && path == "children[1].children[0]"
    ));
    assert_eq!(recording.built(), 0);
    Ok(())
}

#[test]
fn contract_version_mismatch_is_rejected() -> Result<(), Box<dyn Error>> {
    let journal = Journal::default();
    let registry = SinkRegistry::new().with(Arc::new(
        RecordingSinkFactory::new("legacy", journal).with_contract_version(0),
    ));
    let config = parse_logging_config_json(&json!({"children": [{"sink": "legacy"}]}).to_string())?;

    let result = Logger::build(&config, &registry, Arc::new(FixedEnvironment::default()));
    assert!(matches!(result, Err(LogError::ContractViolation { .. })));
    Ok(())
}

#[test]
fn reported_failure_lets_siblings_write() -> Result<(), Box<dyn Error>> {
    let journal = Journal::default();
    let logger = logger(
        &json!({"children": [
            {"sink": "failing", "label": "broken", "messageFormat": "%6$s"},
            {"sink": "recording", "label": "healthy", "messageFormat": "%6$s"}
        ]}),
        &journal,
    )?;

    logger.error("still delivered", Context::new())?;
    assert_eq!(journal.labels(), vec!["broken", "healthy"]);
    Ok(())
}

#[test]
fn propagated_failure_stops_the_fan_out() -> Result<(), Box<dyn Error>> {
    let journal = Journal::default();
    let logger = logger(
        &json!({"children": [
            {"sink": "failing", "label": "broken", "onSinkFailure": "propagate"},
            {"sink": "recording", "label": "never"}
        ]}),
        &journal,
    )?;

    let result = logger.error("lost", Context::new());
    assert!(matches!(
        result,
        Err(LogError::SinkFailure { ref sink_type, .. }) if sink_type == "failing"
    ));
    assert_eq!(journal.labels(), vec!["broken"]);
    Ok(())
}

#[test]
fn log_error_renders_every_cause() -> Result<(), Box<dyn Error>> {
    let journal = Journal::default();
    let logger = logger(
        &json!({"children": [{"sink": "recording", "label": "errors", "messageFormat": "%5$s %6$s%7$s"}]}),
        &journal,
    )?;

    logger.log_error(&nested_error())?;
    let formatted = journal.formatted_for("errors").join("\n");
    assert!(formatted.starts_with("ERROR request failed\nChainedError: request failed in "));
    assert!(formatted.contains("\nError: query failed\n"));
    assert!(formatted.contains("\nError: connection reset\n"));
    assert_eq!(formatted.matches(&format!("\n{CHAIN_SEPARATOR}\n")).count(), 2);
    Ok(())
}

#[test]
fn long_chains_are_truncated() -> Result<(), Box<dyn Error>> {
    let journal = Journal::default();
    let logger = logger(
        &json!({"children": [{"sink": "recording", "label": "errors", "messageFormat": "%7$s"}]}),
        &journal,
    )?;

    let context = Context::new().with_error(EXCEPTION_KEY, error_chain(MAX_CHAIN_DEPTH + 8));
    logger.critical("deep", context)?;

    let formatted = journal.formatted_for("errors").join("\n");
    assert_eq!(formatted.matches("Stack trace:").count(), MAX_CHAIN_DEPTH);
    assert!(formatted.ends_with(TRUNCATION_MARKER));
    assert!(formatted.starts_with("Level0Error: failure at level 0 in level0.rs:1"));
    Ok(())
}
