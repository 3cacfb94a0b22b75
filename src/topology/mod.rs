//! Topology model.
//!
//! This module holds the editable graph of components and links, the
//! per-type identity registry that names them, clipboard operations, and
//! the saved document form of a topology.

pub mod document;
pub mod graph;
pub mod operations;
pub mod registry;
pub mod types;

// Re-export key types for easier access
pub use document::{DocumentError, TopologyDocument};
pub use graph::{ClipboardPayload, GraphError, Link, Node, TopologyGraph};
pub use operations::{ClipboardOperation, ComponentOperations, PasteOutcome};
pub use registry::IdentityRegistry;
pub use types::{ComponentType, LinkId, NodeId, Position};
