//! Graph to [`TopologyDescription`] translation.
//!
//! Export is read-only. Nodes are emitted grouped by type in a fixed type
//! order, ascending component number within a type; links follow in
//! creation order. Nothing time dependent goes into the output, so an
//! unchanged graph always exports to identical statements.

use super::types::{NetworkInit, NetworkKind, NodeMethod, Section, Statement, TopologyDescription};
use crate::config::ExportSettings;
use crate::mapper::{
    post_config_actions, CoreFunction, DockerProfile, LinkConfig, NodeConfig, ParamValue, ParameterSet,
    PostConfigAction,
};
use crate::propagation::{PropagationModel, TWO_RAY_GROUND_EXPONENT};
use crate::topology::{ComponentType, LinkId, Node, NodeId, TopologyGraph};
use crate::utils::naming::sanitize_identifier;
use log::{debug, error, info};
use std::collections::HashMap;

pub const SECTION_CONTROLLERS: &str = "Adding controllers";
pub const SECTION_NODES: &str = "Creating nodes";
pub const SECTION_PROPAGATION: &str = "Configuring propagation model";
pub const SECTION_COVERAGE: &str = "Coverage associations";
pub const SECTION_LINKS: &str = "Creating links";
pub const SECTION_START: &str = "Starting network";
pub const SECTION_SERVICES: &str = "Starting services";
pub const SECTION_CLI: &str = "Running CLI";

/// Name of the controller added when the topology has none.
pub const DEFAULT_CONTROLLER: &str = "c0";

/// Smallest plot area, in canvas units.
const MIN_PLOT_EXTENT: f64 = 1000.0;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ExportError {
    #[error("Cannot export an empty topology")]
    EmptyGraph,
    #[error("Link {link} references node {node}, which is not part of the topology")]
    UnresolvedLink { link: LinkId, node: NodeId },
}

/// A node prepared for emission.
struct Entry<'a> {
    node: &'a Node,
    ident: String,
    config: NodeConfig,
}

/// Translate `graph` into an ordered topology description.
pub fn export(graph: &TopologyGraph, settings: &ExportSettings) -> Result<TopologyDescription, ExportError> {
    if graph.is_empty() {
        return Err(ExportError::EmptyGraph);
    }

    // Endpoints are checked before anything is built.
    for link in graph.links() {
        for endpoint in [link.source(), link.destination()] {
            if graph.node(endpoint).is_none() {
                error!("Link {} has a dangling endpoint {}", link.id(), endpoint);
                return Err(ExportError::UnresolvedLink { link: link.id(), node: endpoint });
            }
        }
    }

    let mut nodes: Vec<&Node> = graph.nodes().collect();
    nodes.sort_by_key(|n| (n.kind().export_rank(), n.component_number()));

    let entries: Vec<Entry> = nodes
        .into_iter()
        .map(|node| Entry {
            node,
            ident: sanitize_identifier(node.display_name()),
            config: NodeConfig::from_properties(node.kind(), &node.properties),
        })
        .collect();
    let idents: HashMap<NodeId, &str> = entries.iter().map(|e| (e.node.id(), e.ident.as_str())).collect();

    let has_radio = entries.iter().any(|e| e.node.kind().is_radio());
    let has_container = entries.iter().any(|e| e.node.kind().is_container());

    let network = NetworkInit {
        kind: if has_radio || has_container {
            NetworkKind::Containernet
        } else {
            NetworkKind::Mininet
        },
        network_mode: settings.network_name.clone(),
        ip_base: settings.ip_base.clone(),
        wireless_medium: has_radio || has_container,
    };

    let mut sections = Vec::new();

    let (controllers, controller_section) = controllers_section(&entries);
    sections.push(controller_section);

    let mut node_section = Section::new(SECTION_NODES);
    for entry in entries.iter().filter(|e| e.node.kind() != ComponentType::Controller) {
        node_section.push(node_statement(entry));
    }
    sections.push(node_section);

    if has_radio {
        sections.push(propagation_section(settings));
        let coverage = coverage_section(graph, &entries, settings);
        if !coverage.is_empty() {
            sections.push(coverage);
        }
    }

    sections.push(links_section(graph, &idents));
    sections.push(start_section(&entries, &controllers, settings));

    let services = services_section(&entries, settings);
    if !services.is_empty() {
        sections.push(services);
    }

    let mut cli = Section::new(SECTION_CLI);
    cli.push(Statement::Cli);
    cli.push(Statement::net_call("stop"));
    sections.push(cli);

    let description = TopologyDescription {
        header: vec![
            "Mininet-WiFi topology generated by netflux5g".to_string(),
            format!("Components: {}, links: {}", graph.node_count(), graph.link_count()),
        ],
        network,
        sections,
    };

    info!(
        "Exported {} components and {} links ({} statements)",
        graph.node_count(),
        graph.link_count(),
        description.statements().count()
    );
    Ok(description)
}

fn controllers_section(entries: &[Entry]) -> (Vec<String>, Section) {
    let mut section = Section::new(SECTION_CONTROLLERS);
    let mut idents = Vec::new();

    for entry in entries.iter().filter(|e| e.node.kind() == ComponentType::Controller) {
        section.push(Statement::AddNode {
            ident: entry.ident.clone(),
            method: NodeMethod::AddController,
            name: entry.node.display_name().to_string(),
            params: entry.config.parameters(),
        });
        idents.push(entry.ident.clone());
    }

    if idents.is_empty() {
        let mut params = ParameterSet::new();
        params.set("controller", ParamValue::symbol("RemoteController"));
        section.push(Statement::AddNode {
            ident: DEFAULT_CONTROLLER.to_string(),
            method: NodeMethod::AddController,
            name: DEFAULT_CONTROLLER.to_string(),
            params,
        });
        idents.push(DEFAULT_CONTROLLER.to_string());
    }

    (idents, section)
}

fn position_param(node: &Node) -> ParamValue {
    ParamValue::str(format!("{:.1},{:.1},0", node.position.x, node.position.y))
}

fn node_statement(entry: &Entry) -> Statement {
    let node = entry.node;
    let kind = node.kind();
    let mapped = entry.config.parameters();
    let mut params = ParameterSet::new();

    let method = match kind {
        ComponentType::AccessPoint => {
            params.set("cls", ParamValue::symbol("OVSKernelAP"));
            params.set("ssid", ParamValue::str(format!("{}-ssid", entry.ident)));
            params.set("failMode", ParamValue::str("standalone"));
            params.set("datapath", ParamValue::str("user"));
            params.extend(mapped);
            params.set("position", position_param(node));
            params.set("protocols", ParamValue::str("OpenFlow13"));
            NodeMethod::AddAccessPoint
        }
        ComponentType::Station => {
            params.set("position", position_param(node));
            params.extend(mapped);
            NodeMethod::AddStation
        }
        ComponentType::Host => {
            params.extend(mapped);
            NodeMethod::AddHost
        }
        ComponentType::Switch | ComponentType::Router => {
            params.set("cls", ParamValue::symbol("OVSKernelSwitch"));
            params.extend(mapped);
            NodeMethod::AddSwitch
        }
        ComponentType::UserEquipment | ComponentType::BaseStation => {
            extend_with_profile(&mut params, kind, None);
            params.set("position", position_param(node));
            params.extend(mapped);
            if kind == ComponentType::UserEquipment {
                NodeMethod::AddStation
            } else {
                NodeMethod::AddDocker
            }
        }
        ComponentType::CoreNetwork => {
            extend_with_profile(&mut params, kind, entry.config.core_function());
            params.extend(mapped);
            NodeMethod::AddDocker
        }
        ComponentType::DockerHost => {
            extend_with_profile(&mut params, kind, None);
            params.extend(mapped);
            NodeMethod::AddHost
        }
        ComponentType::Controller => {
            params.extend(mapped);
            NodeMethod::AddController
        }
    };

    debug!("{} -> {} ({} parameters)", node.display_name(), method.as_str(), params.len());
    Statement::AddNode {
        ident: entry.ident.clone(),
        method,
        name: node.display_name().to_string(),
        params,
    }
}

fn extend_with_profile(params: &mut ParameterSet, kind: ComponentType, function: Option<CoreFunction>) {
    if let Some(profile) = DockerProfile::for_component(kind, function) {
        params.extend(profile.parameters());
    }
}

fn propagation_section(settings: &ExportSettings) -> Section {
    let mut section = Section::new(SECTION_PROPAGATION);
    let mut params = ParameterSet::new();
    // Two-ray-ground coverage is computed as log-distance, so the emulator
    // has to run the same model for the canvas ranges to hold.
    let exponent = match settings.propagation_model {
        PropagationModel::LogDistance => Some(settings.path_loss_exponent),
        PropagationModel::TwoRayGround => Some(TWO_RAY_GROUND_EXPONENT),
        PropagationModel::Friis => None,
    };
    match exponent {
        Some(exp) => {
            params.set("model", ParamValue::str(PropagationModel::LogDistance.as_str()));
            params.set("exp", ParamValue::Float(exp));
        }
        None => params.set("model", ParamValue::str(settings.propagation_model.as_str())),
    }
    section.push(Statement::net_call_with("setPropagationModel", params));
    section.push(Statement::net_call("configureWifiNodes"));
    section
}

/// For every UE and STA, name the nearest AP or gNB whose coverage reaches it.
fn coverage_section(graph: &TopologyGraph, entries: &[Entry], settings: &ExportSettings) -> Section {
    let mut section = Section::new(SECTION_COVERAGE);

    let cells: Vec<(&Entry, f64)> = entries
        .iter()
        .filter(|e| matches!(e.node.kind(), ComponentType::AccessPoint | ComponentType::BaseStation))
        .filter_map(|e| {
            graph
                .coverage_range(e.node.id(), settings.propagation_model, settings.path_loss_exponent)
                .map(|range| (e, range))
        })
        .collect();

    for client in entries
        .iter()
        .filter(|e| matches!(e.node.kind(), ComponentType::UserEquipment | ComponentType::Station))
    {
        let nearest = cells
            .iter()
            .map(|(cell, range)| (cell, *range, client.node.position.distance_to(&cell.node.position)))
            .filter(|(_, range, distance)| distance <= range)
            .min_by(|a, b| a.2.total_cmp(&b.2));

        let text = match nearest {
            Some((cell, range, distance)) => format!(
                "{} is covered by {} ({:.1} m of {:.1} m range)",
                client.node.display_name(),
                cell.node.display_name(),
                distance,
                range
            ),
            None => format!("{} is outside every AP/gNB coverage area", client.node.display_name()),
        };
        section.push(Statement::comment(text));
    }

    section
}

fn links_section(graph: &TopologyGraph, idents: &HashMap<NodeId, &str>) -> Section {
    let mut section = Section::new(SECTION_LINKS);

    for link in graph.links() {
        // Endpoints were verified at the top of `export`.
        let (Some(source), Some(destination)) = (idents.get(&link.source()), idents.get(&link.destination()))
        else {
            continue;
        };

        let touches_controller = [link.source(), link.destination()].iter().any(|id| {
            graph
                .node(*id)
                .is_some_and(|n| n.kind() == ComponentType::Controller)
        });
        if touches_controller {
            section.push(Statement::comment(format!(
                "{} -- {}: control-plane connection, attached via OpenFlow",
                source, destination
            )));
            continue;
        }

        let config = LinkConfig::from_properties(&link.properties);
        let mut params = ParameterSet::new();
        if config.is_shaped() {
            params.set("cls", ParamValue::symbol("TCLink"));
        }
        params.extend(config.parameters());
        section.push(Statement::AddLink {
            source: source.to_string(),
            destination: destination.to_string(),
            params,
        });
    }

    section
}

fn start_section(entries: &[Entry], controllers: &[String], settings: &ExportSettings) -> Section {
    let mut section = Section::new(SECTION_START);

    if settings.plot_graph {
        let (max_x, max_y) = entries.iter().fold((0.0f64, 0.0f64), |(x, y), e| {
            (x.max(e.node.position.x), y.max(e.node.position.y))
        });
        let mut params = ParameterSet::new();
        params.set("max_x", ParamValue::Int(plot_extent(max_x)));
        params.set("max_y", ParamValue::Int(plot_extent(max_y)));
        section.push(Statement::net_call_with("plotGraph", params));
    }

    section.push(Statement::net_call("build"));
    for controller in controllers {
        section.push(Statement::StartController { ident: controller.clone() });
    }
    for entry in entries.iter().filter(|e| {
        matches!(
            e.node.kind(),
            ComponentType::AccessPoint | ComponentType::Switch | ComponentType::Router
        )
    }) {
        section.push(Statement::StartNode {
            ident: entry.ident.clone(),
            controllers: controllers.to_vec(),
        });
    }

    section
}

/// Rounded up to the next hundred above the furthest node, never below the
/// default plot size.
fn plot_extent(max: f64) -> i64 {
    let padded = ((max + 100.0) / 100.0).ceil() * 100.0;
    padded.max(MIN_PLOT_EXTENT) as i64
}

/// Post-start actions: core functions in startup order, then gNBs, then UEs,
/// then everything else. Groups of the 5G stack are separated by the
/// configured startup delay.
fn services_section(entries: &[Entry], settings: &ExportSettings) -> Section {
    let mut section = Section::new(SECTION_SERVICES);

    let mut cores: Vec<&Entry> = entries
        .iter()
        .filter(|e| e.node.kind() == ComponentType::CoreNetwork)
        .collect();
    cores.sort_by_key(|e| {
        (
            e.config.core_function().map_or(usize::MAX, |f| f.startup_rank()),
            e.node.component_number(),
        )
    });
    let of_kind = |kind: ComponentType| entries.iter().filter(move |e| e.node.kind() == kind).collect::<Vec<_>>();
    let gnbs = of_kind(ComponentType::BaseStation);
    let ues = of_kind(ComponentType::UserEquipment);
    let others = entries.iter().filter(|e| {
        !matches!(
            e.node.kind(),
            ComponentType::CoreNetwork | ComponentType::BaseStation | ComponentType::UserEquipment
        )
    });

    let delay = settings.core_startup_delay.as_secs_f64();
    let mut previous_group = false;
    for group in [cores, gnbs, ues] {
        if group.is_empty() {
            continue;
        }
        if previous_group && delay > 0.0 {
            section.push(Statement::Sleep { seconds: delay });
        }
        for entry in group {
            push_actions(&mut section, entry);
        }
        previous_group = true;
    }
    for entry in others {
        push_actions(&mut section, entry);
    }

    section
}

fn push_actions(section: &mut Section, entry: &Entry) {
    for action in post_config_actions(entry.node.kind(), &entry.ident, &entry.node.properties) {
        match action {
            PostConfigAction::Command(command) => section.push(Statement::NodeCommand {
                ident: entry.ident.clone(),
                command,
            }),
            PostConfigAction::Comment(text) => {
                section.push(Statement::comment(format!("{}: {}", entry.node.display_name(), text)))
            }
        }
    }
}
