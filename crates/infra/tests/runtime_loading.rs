//! Runtime construction from config files and env maps.

use logtree_infra::{LoggingRuntime, check_config, default_sink_registry};
use logtree_testkit::FixedEnvironment;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|path| path.parent())
        .map(PathBuf::from)
        .unwrap_or_default()
}

fn fixture(name: &str) -> PathBuf {
    workspace_root()
        .join("crates/testkit/fixtures/config")
        .join(name)
}

#[test]
fn fixture_configs_check_against_builtin_sinks() -> Result<(), Box<dyn std::error::Error>> {
    for name in ["logging.valid.json", "logging.valid.toml", "logging.valid.yaml"] {
        let report = check_config(
            &BTreeMap::new(),
            Some(&fixture(name)),
            None,
            &default_sink_registry(),
            Arc::new(FixedEnvironment::default()),
        )?;
        assert!(report.node_count >= 2, "{name}");
        assert!(report.sink_types.iter().any(|sink| sink == "console"), "{name}");
    }
    Ok(())
}

#[test]
fn runtime_loads_with_explicit_env() -> Result<(), Box<dyn std::error::Error>> {
    let env = BTreeMap::from([("LOGTREE_MIN_LEVEL".to_string(), "error".to_string())]);
    let overrides = r#"{"children": [{"sink": "null"}]}"#;
    let runtime = LoggingRuntime::load_with_env(&env, None, Some(overrides))?;
    let logger = runtime.logger();
    assert_eq!(logger.node_count(), 2);
    logger.info("dropped by the root range", logtree_domain::Context::new())?;
    Ok(())
}

#[test]
fn invalid_fixture_is_rejected() {
    let result = check_config(
        &BTreeMap::new(),
        Some(&fixture("logging.inverted-range.json")),
        None,
        &default_sink_registry(),
        Arc::new(FixedEnvironment::default()),
    );
    assert!(result.is_err());
}
