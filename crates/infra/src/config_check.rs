//! Config loading helpers for CLI surfaces.

use crate::InfraResult;
use logtree_app::{SinkRegistry, build_tree};
use logtree_config::{
    LoggingEnv, ValidatedLoggingConfig, ValidatedNode, load_logging_config_from_path,
    to_pretty_json,
};
use logtree_ports::Environment;
use logtree_shared::ErrorEnvelope;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

/// Summary of a config that loaded, validated, and planned cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigReport {
    /// Config sections, root included.
    pub section_count: usize,
    /// Nodes the built tree contains; sinkless child sections are dropped.
    pub node_count: usize,
    /// Distinct sink identifiers referenced, sorted.
    pub sink_types: Vec<String>,
}

/// Load a config with env overrides applied.
pub fn load_config(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> InfraResult<ValidatedLoggingConfig> {
    let env = LoggingEnv::from_map(env).map_err(ErrorEnvelope::from)?;
    load_logging_config_from_path(config_path, overrides_json, &env)
}

/// Load and validate the effective config, returning deterministic pretty JSON.
pub fn load_effective_config_json(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
) -> InfraResult<String> {
    let config = load_config(env, config_path, overrides_json)?;
    to_pretty_json(&config)
}

/// Load a config and build its tree against `registry` without logging.
///
/// Sink construction performs no I/O, so a clean check means every sink
/// identifier resolves and every section satisfies its factory.
pub fn check_config(
    env: &BTreeMap<String, String>,
    config_path: Option<&Path>,
    overrides_json: Option<&str>,
    registry: &SinkRegistry,
    environment: Arc<dyn Environment>,
) -> InfraResult<ConfigReport> {
    let config = load_config(env, config_path, overrides_json)?;
    let root = build_tree(&config, registry, environment).map_err(ErrorEnvelope::from)?;

    let mut sink_types = BTreeSet::new();
    collect_sink_types(config.root(), &mut sink_types);
    Ok(ConfigReport {
        section_count: config.root().section_count(),
        node_count: root.node_count(),
        sink_types: sink_types.into_iter().collect(),
    })
}

fn collect_sink_types(node: &ValidatedNode, into: &mut BTreeSet<String>) {
    if let Some(sink_type) = &node.sink_type {
        into.insert(sink_type.clone());
    }
    for child in &node.children {
        collect_sink_types(child, into);
    }
}
