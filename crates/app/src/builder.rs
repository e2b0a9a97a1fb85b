//! Tree construction from validated configuration.
//!
//! Construction runs in two passes. The planning pass resolves every sink
//! identifier and checks each factory's contract without building anything;
//! only when the whole tree plans cleanly are sinks instantiated. A failure
//! in either pass returns before a tree exists, so no partial tree is ever
//! observable.

use crate::formatter::MessageFormatter;
use crate::node::{LoggerNode, NodeSink};
use crate::registry::{SinkRegistry, SinkResolution};
use logtree_config::{ValidatedLoggingConfig, ValidatedNode};
use logtree_domain::{LogError, MessageTemplate};
use logtree_ports::{Environment, SINK_CONTRACT_VERSION, SinkFactory, SinkOptions, SinkSection};
use std::sync::Arc;

/// Build the logger tree for `config`.
pub fn build_tree(
    config: &ValidatedLoggingConfig,
    registry: &SinkRegistry,
    environment: Arc<dyn Environment>,
) -> Result<LoggerNode, LogError> {
    let plan = plan_node(config.root(), registry)?;
    let root = instantiate(&plan, &environment)?;

    tracing::debug!(
        nodes = root.node_count(),
        sections = config.root().section_count(),
        "logger tree built"
    );
    Ok(root)
}

struct PlannedNode<'a> {
    section: &'a ValidatedNode,
    resolution: SinkResolution,
    template: Option<MessageTemplate>,
    children: Vec<PlannedNode<'a>>,
}

fn plan_node<'a>(
    section: &'a ValidatedNode,
    registry: &SinkRegistry,
) -> Result<PlannedNode<'a>, LogError> {
    let resolution = match section.sink_type.as_deref() {
        // The root always exists; a sinkless root is an aggregate.
        None => SinkResolution::Aggregate,
        Some(sink_type) => {
            registry
                .resolve(sink_type)
                .ok_or_else(|| LogError::UnknownSinkType {
                    sink_type: sink_type.to_string(),
                    path: section.path.clone(),
                })?
        },
    };

    let template = match &resolution {
        SinkResolution::Aggregate => None,
        SinkResolution::Factory(factory) => Some(check_contract(section, factory.as_ref())?),
    };

    let mut children = Vec::new();
    for child in &section.children {
        if child.sink_type.is_none() {
            tracing::debug!(path = %child.path, "section has no sink; ignored");
            continue;
        }
        children.push(plan_node(child, registry)?);
    }

    Ok(PlannedNode {
        section,
        resolution,
        template,
        children,
    })
}

fn check_contract(
    section: &ValidatedNode,
    factory: &dyn SinkFactory,
) -> Result<MessageTemplate, LogError> {
    let violation = |reason: String| LogError::ContractViolation {
        sink_type: factory.sink_type().to_string(),
        path: section.path.clone(),
        reason,
    };

    let version = factory.contract_version();
    if version != SINK_CONTRACT_VERSION {
        return Err(violation(format!(
            "declares contract version {version}, expected {SINK_CONTRACT_VERSION}"
        )));
    }

    if let Some(template) = section.message_format.clone() {
        return Ok(template);
    }
    match factory.default_message_format() {
        None => Ok(MessageTemplate::default()),
        Some(source) => MessageTemplate::parse(source)
            .map_err(|error| violation(format!("default message format is invalid: {error}"))),
    }
}

fn instantiate(
    plan: &PlannedNode<'_>,
    environment: &Arc<dyn Environment>,
) -> Result<LoggerNode, LogError> {
    let section = plan.section;
    let mut node = LoggerNode::aggregate(section.path.clone(), section.range);

    if let (SinkResolution::Factory(factory), Some(template)) = (&plan.resolution, &plan.template)
    {
        let sink_section = SinkSection {
            path: section.path.clone(),
            options: SinkOptions::from(section.options.clone()),
            environment: Arc::clone(environment),
        };
        let sink = factory
            .build(&sink_section)
            .map_err(|error| LogError::ContractViolation {
                sink_type: factory.sink_type().to_string(),
                path: section.path.clone(),
                reason: format!("factory refused its section: {error}"),
            })?;

        let formatter = MessageFormatter::new(Arc::clone(environment))
            .with_template(template.clone())
            .with_time(section.time_format.clone(), section.time_zone)
            .with_process_name(section.process_name.clone());
        let sink_type = section
            .sink_type
            .clone()
            .unwrap_or_else(|| factory.sink_type().to_string());
        node = node.with_sink(NodeSink::new(sink_type, sink, formatter, section.on_sink_failure));
    }

    for child in &plan.children {
        node = node.with_child(instantiate(child, environment)?);
    }
    Ok(node)
}
