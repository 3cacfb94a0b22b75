//! End-to-end regression tests for topology editing and export.
//!
//! These drive the public API the way the editor does: build a graph,
//! cut/copy/paste components, save and reload documents, and export
//! scripts.

use netflux5g::config::ExportSettings;
use netflux5g::export::{export, render, render_python, ExportError, ExportFormat, Statement};
use netflux5g::mapper::{map_config, map_link, ParamValue};
use netflux5g::propagation::{self, PropagationModel, RadioParams};
use netflux5g::properties::Properties;
use netflux5g::topology::{
    ComponentOperations, ComponentType, PasteOutcome, Position, TopologyDocument, TopologyGraph,
};
use std::collections::HashSet;

fn at(x: f64, y: f64) -> Position {
    Position::new(x, y)
}

fn assert_unique_names(graph: &TopologyGraph) {
    let mut seen = HashSet::new();
    for node in graph.nodes() {
        assert!(
            seen.insert((node.kind(), node.component_number())),
            "duplicate number for {}",
            node.display_name()
        );
    }
    assert!(graph.check_invariants().is_ok());
}

/// Builds a small 5G deployment: core, gNB, two UEs, a switch and a host.
fn five_g_lab() -> TopologyGraph {
    let mut graph = TopologyGraph::new();
    let amf = graph.add_node(ComponentType::CoreNetwork, at(0.0, 0.0));
    graph.set_node_property(amf, "VGCore_Component", "amf").unwrap();
    let upf = graph.add_node(ComponentType::CoreNetwork, at(0.0, 100.0));
    graph.set_node_property(upf, "VGCore_Component", "upf").unwrap();
    let switch = graph.add_node(ComponentType::Switch, at(100.0, 50.0));
    let gnb = graph.add_node(ComponentType::BaseStation, at(200.0, 50.0));
    let ue1 = graph.add_node(ComponentType::UserEquipment, at(260.0, 0.0));
    let ue2 = graph.add_node(ComponentType::UserEquipment, at(260.0, 100.0));
    let host = graph.add_node(ComponentType::Host, at(100.0, 200.0));

    graph.add_link(amf, switch).unwrap();
    graph.add_link(upf, switch).unwrap();
    let backhaul = graph.add_link(switch, gnb).unwrap();
    graph.set_link_property(backhaul, "bandwidth", 1000i64).unwrap();
    graph.set_link_property(backhaul, "delay", "2ms").unwrap();
    graph.add_link(gnb, ue1).unwrap();
    graph.add_link(gnb, ue2).unwrap();
    graph.add_link(switch, host).unwrap();
    graph
}

#[test]
fn test_identity_uniqueness_under_churn() {
    let mut graph = TopologyGraph::new();
    let mut live = Vec::new();
    for i in 0..12 {
        live.push(graph.add_node(ComponentType::UserEquipment, at(i as f64 * 70.0, 0.0)));
    }
    // Delete every third node, then refill.
    for id in live.iter().step_by(3) {
        graph.delete_node(*id).unwrap();
    }
    assert_unique_names(&graph);
    for i in 0..4 {
        graph.add_node(ComponentType::UserEquipment, at(i as f64 * 70.0, 500.0));
    }
    assert_unique_names(&graph);
    assert_eq!(graph.registry().max_assigned(ComponentType::UserEquipment), 12);
    assert!(graph.registry().available(ComponentType::UserEquipment).is_empty());
}

#[test]
fn test_deleted_number_is_reused() {
    let mut graph = TopologyGraph::new();
    graph.add_node(ComponentType::UserEquipment, at(0.0, 0.0));
    graph.add_node(ComponentType::UserEquipment, at(100.0, 0.0));
    let ue3 = graph.add_node(ComponentType::UserEquipment, at(200.0, 0.0));
    graph.add_node(ComponentType::UserEquipment, at(300.0, 0.0));

    graph.delete_node(ue3).unwrap();
    let replacement = graph.add_node(ComponentType::UserEquipment, at(400.0, 0.0));
    let node = graph.node(replacement).unwrap();
    assert_eq!(node.component_number(), 3);
    assert_eq!(node.display_name(), "UE3");
}

#[test]
fn test_cut_paste_keeps_name() {
    let mut graph = TopologyGraph::new();
    graph.add_node(ComponentType::BaseStation, at(0.0, 0.0));
    let gnb2 = graph.add_node(ComponentType::BaseStation, at(100.0, 0.0));
    graph.add_node(ComponentType::BaseStation, at(200.0, 0.0));
    graph.set_node_property(gnb2, "GNB_TAC", "7").unwrap();

    let mut ops = ComponentOperations::new();
    ops.cut(&mut graph, gnb2).unwrap();
    match ops.paste(&mut graph, at(500.0, 500.0)).unwrap() {
        PasteOutcome::Pasted { node, display_name, .. } => {
            assert_eq!(display_name, "GNB2");
            let pasted = graph.node(node).unwrap();
            assert_eq!(pasted.component_number(), 2);
            assert_eq!(pasted.properties.text("GNB_TAC").as_deref(), Some("7"));
        }
        PasteOutcome::EmptyClipboard => panic!("clipboard should hold GNB2"),
    }
    assert!(graph.node(gnb2).is_none());
    assert_eq!(graph.nodes_of(ComponentType::BaseStation).count(), 3);
    assert!(!ops.has_clipboard_data());
    assert_unique_names(&graph);
}

#[test]
fn test_empty_clipboard_paste_is_reported() {
    let mut graph = TopologyGraph::new();
    let mut ops = ComponentOperations::new();
    assert_eq!(ops.paste(&mut graph, at(0.0, 0.0)).unwrap(), PasteOutcome::EmptyClipboard);
    assert!(graph.is_empty());
}

#[test]
fn test_cascade_removes_every_incident_link() {
    let mut graph = five_g_lab();
    let switch = graph.find_by_name("Switch1").unwrap().id();
    let incident = graph.node(switch).unwrap().connected_links().len();
    assert_eq!(incident, 4);

    let before = graph.link_count();
    let removed = graph.delete_node(switch).unwrap();
    assert_eq!(removed.links.len(), incident);
    assert_eq!(graph.link_count(), before - incident);
    for node in graph.nodes() {
        for link in node.connected_links() {
            assert!(graph.link(*link).is_some(), "{} keeps a dangling link", node.display_name());
        }
    }
    assert!(graph.check_invariants().is_ok());
}

#[test]
fn test_self_link_is_rejected_without_change() {
    let mut graph = TopologyGraph::new();
    let host = graph.add_node(ComponentType::Host, at(0.0, 0.0));
    assert!(graph.add_link(host, host).is_err());
    assert_eq!(graph.link_count(), 0);
    assert!(graph.node(host).unwrap().connected_links().is_empty());
}

#[test]
fn test_power_range_round_trip_and_monotonicity() {
    for model in [PropagationModel::LogDistance, PropagationModel::Friis] {
        for frequency in [2.4, 3.5, 5.0] {
            let params = RadioParams::default().with_frequency(frequency);
            let mut previous = 0.0;
            for power in [1.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0] {
                let range = propagation::range_from_power(power, &params, model);
                assert!(range > previous, "{} not increasing at {} dBm", model, power);
                previous = range;

                let back = propagation::power_from_range(range, &params, model);
                assert!((back - power).abs() <= 1e-6 * power.abs().max(1.0), "{} != {}", back, power);
            }
        }
    }
}

#[test]
fn test_export_is_deterministic() {
    let graph = five_g_lab();
    let settings = ExportSettings::default();
    let first = render_python(&export(&graph, &settings).unwrap());
    let second = render_python(&export(&graph, &settings).unwrap());
    assert_eq!(first, second);
    assert!(!graph.is_empty());
}

#[test]
fn test_export_groups_by_type() {
    let mut graph = TopologyGraph::new();
    graph.add_node(ComponentType::Host, at(0.0, 0.0));
    graph.add_node(ComponentType::UserEquipment, at(100.0, 0.0));
    graph.add_node(ComponentType::Host, at(200.0, 0.0));

    let description = export(&graph, &ExportSettings::default()).unwrap();
    assert_eq!(description.node_names(), vec!["Host1", "Host2", "UE1"]);

    let script = render_python(&description);
    let host1 = script.find("Host1 = net.addHost").unwrap();
    let host2 = script.find("Host2 = net.addHost").unwrap();
    let ue1 = script.find("UE1 = net.addStation").unwrap();
    assert!(host1 < host2 && host2 < ue1);
}

#[test]
fn test_access_point_power_scenarios() {
    let params = map_config(ComponentType::AccessPoint, &Properties::new());
    assert_eq!(params.get("txpower").and_then(ParamValue::as_f64), Some(20.0));
    assert!(!params.contains("range"));

    let props: Properties = [("AP_Power", "15")].into_iter().collect();
    let params = map_config(ComponentType::AccessPoint, &props);
    assert_eq!(params.get("txpower").and_then(ParamValue::as_f64), Some(15.0));
    assert!(!params.contains("range"));

    let mut graph = TopologyGraph::new();
    graph.add_node(ComponentType::AccessPoint, at(0.0, 0.0));
    let script = render_python(&export(&graph, &ExportSettings::default()).unwrap());
    assert!(script.contains("txpower=20"));
    assert!(!script.contains("range="));
}

#[test]
fn test_zero_bandwidth_link_omits_bw() {
    let mut graph = TopologyGraph::new();
    let h1 = graph.add_node(ComponentType::Host, at(0.0, 0.0));
    let h2 = graph.add_node(ComponentType::Host, at(100.0, 0.0));
    let link = graph.add_link(h1, h2).unwrap();
    graph.set_link_property(link, "bandwidth", 0i64).unwrap();

    assert!(!map_link(&graph.link(link).unwrap().properties).contains("bw"));
    let script = render_python(&export(&graph, &ExportSettings::default()).unwrap());
    assert!(script.contains("    net.addLink(Host1, Host2)\n"));
}

#[test]
fn test_empty_graph_export_fails() {
    let graph = TopologyGraph::new();
    assert_eq!(export(&graph, &ExportSettings::default()).unwrap_err(), ExportError::EmptyGraph);
}

#[test]
fn test_five_g_script_contents() {
    let graph = five_g_lab();
    let script = render_python(&export(&graph, &ExportSettings::default()).unwrap());

    assert!(script.contains("    NETWORK_MODE = 'netflux5g'\n"));
    assert!(script.contains("net = Containernet(topo=None, build=False, link=wmediumd"));
    assert!(script.contains("c0 = net.addController('c0', controller=RemoteController)"));
    assert!(script.contains("VGcore2 = net.addDocker('VGcore2', cls=DockerSta, dimage='adaptive/open5gs:latest'"));
    assert!(script.contains("net.setPropagationModel(model='logDistance', exp=3)"));
    assert!(script.contains("net.addLink(Switch1, GNB1, cls=TCLink, bw=1000, delay='2ms')"));
    assert!(script.contains("Switch1.start([c0])"));
    assert!(script.contains("CLI.do_sh(net, 'sleep 5')"));
    assert!(script.contains("UE1.cmd('ip route add 10.100.0.0/16 dev uesimtun0')"));

    let amf_start = script.find("VGcore1.cmd(").unwrap();
    let upf_start = script.find("VGcore2.cmd(").unwrap();
    let gnb_start = script.find("GNB1.cmd(").unwrap();
    assert!(amf_start < upf_start && upf_start < gnb_start);
}

#[test]
fn test_document_round_trip_preserves_names_and_links() {
    let mut graph = five_g_lab();
    let ue1 = graph.find_by_name("UE1").unwrap().id();
    graph.delete_node(ue1).unwrap();

    let document = graph.to_document(Some("lab"));
    let json = serde_json::to_string(&document).unwrap();
    let parsed: TopologyDocument = serde_json::from_str(&json).unwrap();
    let mut reloaded = TopologyGraph::from_document(&parsed).unwrap();

    assert_eq!(reloaded.node_count(), graph.node_count());
    assert_eq!(reloaded.link_count(), graph.link_count());
    assert!(reloaded.find_by_name("UE1").is_none());
    assert!(reloaded.find_by_name("UE2").is_some());

    // The gap left by UE1 is filled first after the reload.
    let fresh = reloaded.add_node(ComponentType::UserEquipment, at(900.0, 900.0));
    assert_eq!(reloaded.node(fresh).unwrap().display_name(), "UE1");
    assert_unique_names(&reloaded);

    let original = render_python(&export(&graph, &ExportSettings::default()).unwrap());
    reloaded.delete_node(fresh).unwrap();
    let again = render_python(&export(&reloaded, &ExportSettings::default()).unwrap());
    assert_eq!(original, again);
}

#[test]
fn test_document_with_null_and_table_properties_loads() {
    let json = r#"{
  "version": "1.0",
  "nodes": [
    {"type": "AP", "x": 0, "y": 0, "properties": {"name": "AP1", "AP_SSID": null}},
    {"type": "VGcore", "x": 100, "y": 0, "properties": {
      "name": "VGcore1",
      "VGCore_Component": "amf",
      "AMF_configs": [{"name": "amf1", "ngap": "10.0.0.5"}]
    }}
  ],
  "links": []
}"#;
    let document: TopologyDocument = serde_json::from_str(json).unwrap();
    let graph = TopologyGraph::from_document(&document).unwrap();
    assert_eq!(graph.node_count(), 2);

    let core = graph.find_by_name("VGcore1").unwrap();
    assert_eq!(core.properties.text("AMF_configs"), None);

    let description = export(&graph, &ExportSettings::default()).unwrap();
    let ap = description.node_params("AP1").unwrap();
    assert_eq!(ap.get("ssid").and_then(ParamValue::as_str), Some("AP1-ssid"));

    let saved = serde_json::to_value(graph.to_document(None)).unwrap();
    let tables: Vec<&serde_json::Value> = saved["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["properties"].get("AMF_configs"))
        .collect();
    assert_eq!(tables, vec![&serde_json::json!([{"name": "amf1", "ngap": "10.0.0.5"}])]);
}

#[test]
fn test_structured_formats_render() {
    let graph = five_g_lab();
    let description = export(&graph, &ExportSettings::default()).unwrap();
    let json = render(&description, ExportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["network"]["kind"], "Containernet");
    assert!(value["sections"].as_array().unwrap().len() > 3);

    let yaml = render(&description, ExportFormat::Yaml).unwrap();
    assert!(yaml.contains("statement: add_link"));
    assert!(description
        .statements()
        .any(|s| matches!(s, Statement::Cli)));
}
