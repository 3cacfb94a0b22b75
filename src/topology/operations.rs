//! Cut, copy and paste of single components.
//!
//! The clipboard lives outside the graph so one editor session can keep it
//! across loads. A cut does not remove anything up front: the node is
//! dimmed, and only the paste deletes it. Deleting before creating means a
//! cut-and-paste hands the node its own number back.

use super::graph::{ClipboardPayload, GraphError, TopologyGraph};
use super::types::{ComponentType, NodeId, Position};

/// Footprint probed around a paste target.
pub const PASTE_FOOTPRINT: f64 = 60.0;
/// Offsets tried, per axis, when the target is occupied.
const PASTE_OFFSETS: [f64; 4] = [0.0, 60.0, 120.0, 180.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardOperation {
    Cut,
    Copy,
}

#[derive(Debug, Clone)]
struct Clipboard {
    payload: ClipboardPayload,
    operation: ClipboardOperation,
    /// Node to remove on paste. Only set for cuts.
    cut_source: Option<NodeId>,
}

/// Summary of the clipboard for status bars and menus.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardInfo {
    pub kind: ComponentType,
    pub source_name: String,
    pub operation: ClipboardOperation,
}

/// Result of a paste.
#[derive(Debug, Clone, PartialEq)]
pub enum PasteOutcome {
    Pasted {
        node: NodeId,
        display_name: String,
        position: Position,
        operation: ClipboardOperation,
    },
    /// Nothing on the clipboard; the graph was not touched.
    EmptyClipboard,
}

/// Clipboard-backed component operations.
#[derive(Debug, Clone, Default)]
pub struct ComponentOperations {
    clipboard: Option<Clipboard>,
}

impl ComponentOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `node` on the clipboard as a pending cut.
    pub fn cut(&mut self, graph: &mut TopologyGraph, node: NodeId) -> Result<(), GraphError> {
        let payload = graph.cut_node(node)?;
        self.release_pending_cut(graph, Some(node));
        log::info!("Cut {}", payload.source_name);
        self.clipboard = Some(Clipboard {
            payload,
            operation: ClipboardOperation::Cut,
            cut_source: Some(node),
        });
        Ok(())
    }

    /// Put a copy of `node` on the clipboard. Any pending cut is abandoned
    /// and its node restored.
    pub fn copy(&mut self, graph: &mut TopologyGraph, node: NodeId) -> Result<(), GraphError> {
        let payload = graph.copy_node(node)?;
        self.release_pending_cut(graph, None);
        log::info!("Copied {}", payload.source_name);
        self.clipboard = Some(Clipboard {
            payload,
            operation: ClipboardOperation::Copy,
            cut_source: None,
        });
        Ok(())
    }

    /// Paste the clipboard at `target`, or the nearest free spot around it.
    ///
    /// For a cut, the original node is deleted first. The registry is always
    /// resynced before the new node is numbered. A cut clipboard is emptied by
    /// the paste; a copy clipboard can be pasted again.
    pub fn paste(&mut self, graph: &mut TopologyGraph, target: Position) -> Result<PasteOutcome, GraphError> {
        let Some(clipboard) = self.clipboard.as_ref() else {
            log::debug!("Paste requested with an empty clipboard");
            return Ok(PasteOutcome::EmptyClipboard);
        };
        let operation = clipboard.operation;
        let payload = clipboard.payload.clone();

        if let Some(source) = clipboard.cut_source {
            if graph.node(source).is_some() {
                graph.delete_node(source)?;
            } else {
                log::warn!("Cut source {} no longer exists, pasting anyway", payload.source_name);
            }
        }
        graph.resync()?;

        let position = free_position(graph, target);
        let node = graph.add_node_from_payload(&payload, position);
        let display_name = graph
            .node(node)
            .map(|n| n.display_name().to_string())
            .unwrap_or_default();

        if operation == ClipboardOperation::Cut {
            self.clipboard = None;
        }
        log::info!(
            "Pasted {} as {} at ({:.1}, {:.1})",
            payload.source_name,
            display_name,
            position.x,
            position.y
        );
        Ok(PasteOutcome::Pasted { node, display_name, position, operation })
    }

    /// Drop the clipboard, restoring a pending cut.
    pub fn clear_clipboard(&mut self, graph: &mut TopologyGraph) {
        self.release_pending_cut(graph, None);
        self.clipboard = None;
    }

    pub fn has_clipboard_data(&self) -> bool {
        self.clipboard.is_some()
    }

    pub fn clipboard_info(&self) -> Option<ClipboardInfo> {
        self.clipboard.as_ref().map(|c| ClipboardInfo {
            kind: c.payload.kind,
            source_name: c.payload.source_name.clone(),
            operation: c.operation,
        })
    }

    fn release_pending_cut(&mut self, graph: &mut TopologyGraph, keep: Option<NodeId>) {
        let pending = self.clipboard.as_ref().and_then(|c| c.cut_source);
        if let Some(previous) = pending.filter(|p| Some(*p) != keep) {
            graph.set_dimmed(previous, false);
        }
    }
}

/// `target` if its footprint is empty, else the first free spot on a grid of
/// 60-unit steps to the right and below it. Falls back to `target`.
pub fn free_position(graph: &TopologyGraph, target: Position) -> Position {
    if graph.is_area_free(target, PASTE_FOOTPRINT) {
        return target;
    }
    for dx in PASTE_OFFSETS {
        for dy in PASTE_OFFSETS {
            if dx == 0.0 && dy == 0.0 {
                continue;
            }
            let candidate = target.offset(dx, dy);
            if graph.is_area_free(candidate, PASTE_FOOTPRINT) {
                return candidate;
            }
        }
    }
    target
}
