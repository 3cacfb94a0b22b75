//! Saved topology document.
//!
//! Nodes are stored with their type, position and property bag; the node's
//! display name rides along as the `name` property so numbering survives a
//! save/load cycle. Links reference nodes by index into the node list.

use super::graph::{GraphError, LinkSpec, NodeSpec, TopologyGraph};
use super::types::{ComponentType, NodeId, Position, UnknownComponentType};
use crate::properties::Properties;
use crate::utils::naming::parse_display_name;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DOCUMENT_VERSION: &str = "1.0";
pub const DOCUMENT_KIND: &str = "NetFlux5G_Topology";

/// Errors raised while turning a document back into a graph.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Node {index}: {source}")]
    UnknownComponent {
        index: usize,
        #[source]
        source: UnknownComponentType,
    },
    #[error("Link {link} references node {node}, but the document has {count} nodes")]
    DanglingLink { link: usize, node: usize, count: usize },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyDocument {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
    #[serde(default)]
    pub nodes: Vec<DocumentNode>,
    #[serde(default)]
    pub links: Vec<DocumentLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLink {
    pub source: usize,
    pub destination: usize,
    #[serde(default)]
    pub properties: Properties,
}

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

fn default_kind() -> String {
    DOCUMENT_KIND.to_string()
}

impl TopologyGraph {
    /// Snapshot the graph as a document. `saved_at` is left unset; the
    /// loader stamps it when writing to disk.
    pub fn to_document(&self, title: Option<&str>) -> TopologyDocument {
        let mut index: HashMap<NodeId, usize> = HashMap::new();
        let nodes = self
            .nodes()
            .enumerate()
            .map(|(i, node)| {
                index.insert(node.id(), i);
                let mut properties = node.properties.clone();
                properties.set("name", node.display_name());
                DocumentNode {
                    kind: node.kind().as_str().to_string(),
                    x: node.position.x,
                    y: node.position.y,
                    properties,
                    icon: node.icon.clone(),
                }
            })
            .collect();

        // Links always reference live nodes, so the lookups succeed.
        let links = self
            .links()
            .filter_map(|link| {
                Some(DocumentLink {
                    source: *index.get(&link.source())?,
                    destination: *index.get(&link.destination())?,
                    properties: link.properties.clone(),
                })
            })
            .collect();

        TopologyDocument {
            version: default_version(),
            kind: default_kind(),
            metadata: DocumentMetadata {
                saved_at: None,
                title: title.map(str::to_string),
            },
            nodes,
            links,
        }
    }

    /// Build a graph from a document, keeping stored names where possible.
    pub fn from_document(document: &TopologyDocument) -> Result<TopologyGraph, DocumentError> {
        let mut graph = TopologyGraph::new();
        graph.load_document(document)?;
        Ok(graph)
    }

    /// Replace this graph's content with the document's.
    pub fn load_document(&mut self, document: &TopologyDocument) -> Result<Vec<NodeId>, DocumentError> {
        if document.version != DOCUMENT_VERSION {
            log::warn!(
                "Topology document version {} differs from {}, loading anyway",
                document.version,
                DOCUMENT_VERSION
            );
        }

        let mut nodes = Vec::with_capacity(document.nodes.len());
        for (index, entry) in document.nodes.iter().enumerate() {
            let kind: ComponentType = entry
                .kind
                .parse()
                .map_err(|source| DocumentError::UnknownComponent { index, source })?;
            let number = entry
                .properties
                .text("name")
                .and_then(|name| parse_display_name(&name))
                .filter(|(prefix, _)| *prefix == kind)
                .map(|(_, n)| n);
            nodes.push(NodeSpec {
                kind,
                position: Position::new(entry.x, entry.y),
                properties: entry.properties.clone(),
                number,
                icon: entry.icon.clone(),
            });
        }

        let count = nodes.len();
        let mut links = Vec::with_capacity(document.links.len());
        for (link, entry) in document.links.iter().enumerate() {
            for node in [entry.source, entry.destination] {
                if node >= count {
                    return Err(DocumentError::DanglingLink { link, node, count });
                }
            }
            links.push(LinkSpec {
                source: entry.source,
                destination: entry.destination,
                properties: entry.properties.clone(),
            });
        }

        Ok(self.load(nodes, links)?)
    }
}
