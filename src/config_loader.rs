//! File loading and saving: editor configuration and topology documents.

use crate::config::EditorConfig;
use crate::topology::{TopologyDocument, TopologyGraph};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{debug, info};
use std::fs::{self, File};
use std::path::Path;

/// Load and validate the editor configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<EditorConfig> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;
    let config: EditorConfig = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// Load `path` if given, else the built-in defaults.
pub fn load_config_or_default(config_path: Option<&Path>) -> Result<EditorConfig> {
    match config_path {
        Some(path) => load_config(path),
        None => {
            debug!("No configuration file given, using defaults");
            Ok(EditorConfig::default())
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// Read a topology document. `.yaml`/`.yml` files are parsed as YAML,
/// anything else as JSON.
pub fn load_document(path: &Path) -> Result<TopologyDocument> {
    info!("Loading topology from: {:?}", path);

    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read topology '{}'", path.display()))?;
    let document: TopologyDocument = if is_yaml(path) {
        serde_yaml::from_str(&content).wrap_err("Failed to parse YAML topology")?
    } else {
        serde_json::from_str(&content).wrap_err("Failed to parse JSON topology")?
    };

    debug!(
        "Document version {} with {} nodes and {} links",
        document.version,
        document.nodes.len(),
        document.links.len()
    );
    Ok(document)
}

/// Read a topology document and build its graph.
pub fn load_topology(path: &Path) -> Result<TopologyGraph> {
    let document = load_document(path)?;
    let graph = TopologyGraph::from_document(&document)
        .wrap_err_with(|| format!("Invalid topology '{}'", path.display()))?;
    info!(
        "Loaded {} components and {} links",
        graph.node_count(),
        graph.link_count()
    );
    Ok(graph)
}

/// Write `graph` to `path` in the format its extension names, stamping the
/// save time, and mark the graph saved.
pub fn save_topology(graph: &mut TopologyGraph, path: &Path, title: Option<&str>) -> Result<()> {
    let mut document = graph.to_document(title);
    document.metadata.saved_at = Some(chrono::Utc::now());

    let content = if is_yaml(path) {
        serde_yaml::to_string(&document).wrap_err("Failed to serialise topology as YAML")?
    } else {
        serde_json::to_string_pretty(&document).wrap_err("Failed to serialise topology as JSON")?
    };
    fs::write(path, content).wrap_err_with(|| format!("Failed to write topology '{}'", path.display()))?;

    graph.mark_saved();
    info!("Saved topology to: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::PropagationModel;
    use crate::topology::{ComponentType, Position};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config() {
        let yaml = r#"
general:
  log_level: warn
export:
  network_name: testbed
  propagation_model: friis
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.export.network_name, "testbed");
        assert_eq!(config.export.propagation_model, PropagationModel::Friis);
        assert_eq!(config.log_filter(), "warn");
    }

    #[test]
    fn test_load_invalid_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "export:\n  path_loss_exponent: -1\n").unwrap();
        assert!(load_config(temp_file.path()).is_err());
        assert!(load_config_or_default(None).is_ok());
    }

    #[test]
    fn test_load_json_topology() {
        let json = r#"{
  "version": "1.0",
  "type": "NetFlux5G_Topology",
  "nodes": [
    {"type": "Host", "x": 0, "y": 0, "properties": {"name": "Host2", "Host_IPAddress": "10.0.0.2"}},
    {"type": "Switch", "x": 100, "y": 0, "properties": {"name": "Switch1"}}
  ],
  "links": [
    {"source": 0, "destination": 1, "properties": {"bandwidth": "100"}}
  ]
}"#;
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        write!(temp_file, "{}", json).unwrap();

        let graph = load_topology(temp_file.path()).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.link_count(), 1);
        assert!(graph.find_by_name("Host2").is_some());
        assert!(!graph.is_modified());
    }

    #[test]
    fn test_save_and_reload_yaml() {
        let mut graph = TopologyGraph::new();
        let ue = graph.add_node(ComponentType::UserEquipment, Position::new(10.0, 20.0));
        let gnb = graph.add_node(ComponentType::BaseStation, Position::new(60.0, 20.0));
        graph.add_link(ue, gnb).unwrap();
        assert!(graph.is_modified());

        let temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        save_topology(&mut graph, temp_file.path(), Some("lab")).unwrap();
        assert!(!graph.is_modified());

        let document = load_document(temp_file.path()).unwrap();
        assert!(document.metadata.saved_at.is_some());
        assert_eq!(document.metadata.title.as_deref(), Some("lab"));

        let reloaded = load_topology(temp_file.path()).unwrap();
        assert!(reloaded.find_by_name("UE1").is_some());
        assert!(reloaded.find_by_name("GNB1").is_some());
        assert_eq!(reloaded.link_count(), 1);
    }

    #[test]
    fn test_unknown_component_type() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        write!(temp_file, r#"{{"nodes": [{{"type": "Toaster"}}]}}"#).unwrap();
        assert!(load_topology(temp_file.path()).is_err());
    }
}
