//! Full-state sync events exchanged over the relay.

use serde_json::Value;

use crate::domain::{Edge, Node, graph::decode_sequence};
use flowsync_server::infrastructure::dto::websocket::ClientMessage;

/// `{roomId, nodes, edges}`: a full-state snapshot, never a diff.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncEvent {
    pub room_id: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl SyncEvent {
    pub fn into_message(self, ack_id: Option<u64>) -> ClientMessage {
        ClientMessage::ChartUpdated {
            room_id: self.room_id,
            nodes: serde_json::to_value(&self.nodes).unwrap_or_else(|e| {
                tracing::error!("Failed to encode nodes: {}", e);
                Value::Array(Vec::new())
            }),
            edges: serde_json::to_value(&self.edges).unwrap_or_else(|e| {
                tracing::error!("Failed to encode edges: {}", e);
                Value::Array(Vec::new())
            }),
            ack_id,
        }
    }
}

/// A peer's state as received from the relay, already decoded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemoteUpdate {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl RemoteUpdate {
    /// Decode relay payloads. Missing or malformed parts become empty.
    pub fn decode(nodes: &Value, edges: &Value) -> Self {
        Self {
            nodes: decode_sequence(Some(nodes), "nodes"),
            edges: decode_sequence(Some(edges), "edges"),
        }
    }
}
