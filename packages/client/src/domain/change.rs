//! Change descriptors emitted by the editor surface, and their pure
//! application to node / edge sequences.

use serde::{Deserialize, Serialize};

use super::graph::{Connection, Dimensions, Edge, Node, XYPosition};

/// A single node mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeChange {
    /// Move. `dragging` is `Some(true)` while the pointer is still down.
    Position {
        id: String,
        #[serde(default)]
        position: Option<XYPosition>,
        #[serde(default)]
        dragging: Option<bool>,
    },
    /// Resize. `resizing` is `Some(true)` while the gesture is in flight.
    Dimensions {
        id: String,
        #[serde(default)]
        dimensions: Option<Dimensions>,
        #[serde(default)]
        resizing: Option<bool>,
    },
    Select { id: String, selected: bool },
    Remove { id: String },
    Add { node: Node },
}

impl NodeChange {
    pub fn id(&self) -> &str {
        match self {
            Self::Position { id, .. }
            | Self::Dimensions { id, .. }
            | Self::Select { id, .. }
            | Self::Remove { id } => id,
            Self::Add { node } => &node.id,
        }
    }
}

/// A single edge mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EdgeChange {
    Add { edge: Edge },
    Remove { id: String },
    Select { id: String, selected: bool },
}

/// Apply a batch of node changes in order.
///
/// Changes naming an unknown id are skipped. Removing a node also drops the
/// edges attached to it, so the caller passes both sequences.
pub fn apply_node_changes(changes: &[NodeChange], nodes: &mut Vec<Node>, edges: &mut Vec<Edge>) {
    for change in changes {
        match change {
            NodeChange::Position { id, position, .. } => {
                if let (Some(node), Some(position)) = (find_mut(nodes, id), position) {
                    node.position = *position;
                }
            }
            NodeChange::Dimensions { id, dimensions, .. } => {
                if let (Some(node), Some(dimensions)) = (find_mut(nodes, id), dimensions) {
                    node.set_dimensions(*dimensions);
                }
            }
            NodeChange::Select { id, selected } => {
                if let Some(node) = find_mut(nodes, id) {
                    node.selected = *selected;
                }
            }
            NodeChange::Remove { id } => {
                nodes.retain(|n| &n.id != id);
                edges.retain(|e| &e.source != id && &e.target != id);
            }
            NodeChange::Add { node } => {
                if nodes.iter().any(|n| n.id == node.id) {
                    tracing::warn!("Ignoring add of duplicate node id: {}", node.id);
                } else {
                    nodes.push(node.clone());
                }
            }
        }
    }
}

/// Apply a batch of edge changes in order.
pub fn apply_edge_changes(changes: &[EdgeChange], edges: &mut Vec<Edge>) {
    for change in changes {
        match change {
            EdgeChange::Add { edge } => {
                if !edges.iter().any(|e| e.id == edge.id) {
                    edges.push(edge.clone());
                }
            }
            EdgeChange::Remove { id } => edges.retain(|e| &e.id != id),
            EdgeChange::Select { id, selected } => {
                if let Some(edge) = edges.iter_mut().find(|e| &e.id == id) {
                    edge.selected = *selected;
                }
            }
        }
    }
}

/// Turn a connection into an edge add.
///
/// Returns `None` when an edge with the same endpoints and handles exists.
pub fn connect(connection: Connection, edges: &[Edge]) -> Option<EdgeChange> {
    if edges.iter().any(|e| e.matches(&connection)) {
        return None;
    }
    Some(EdgeChange::Add {
        edge: connection.into_edge(),
    })
}

fn find_mut<'a>(nodes: &'a mut [Node], id: &str) -> Option<&'a mut Node> {
    nodes.iter_mut().find(|n| n.id == id)
}
