//! WebSocket message DTOs for the collaboration relay.
//!
//! Frames are JSON text, internally tagged by `type` in kebab-case. The relay
//! treats `nodes` and `edges` as opaque JSON and forwards them untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages sent by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinRoom {
        room_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ack_id: Option<u64>,
    },
    LeaveRoom {
        room_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ack_id: Option<u64>,
    },
    /// Full-state snapshot of the sender's graph
    ChartUpdated {
        room_id: String,
        #[serde(default)]
        nodes: Value,
        #[serde(default)]
        edges: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ack_id: Option<u64>,
    },
}

impl ClientMessage {
    pub fn ack_id(&self) -> Option<u64> {
        match self {
            Self::JoinRoom { ack_id, .. }
            | Self::LeaveRoom { ack_id, .. }
            | Self::ChartUpdated { ack_id, .. } => *ack_id,
        }
    }
}

/// Messages sent by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Room occupancy after a join / leave / disconnect
    UserCount { count: usize },
    /// A peer's full-state snapshot
    ChartUpdated {
        #[serde(default)]
        nodes: Value,
        #[serde(default)]
        edges: Value,
    },
    /// The request carrying `ack_id` has been processed
    Ack { ack_id: u64 },
    /// The request was rejected
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ack_id: Option<u64>,
        message: String,
    },
}

impl ServerMessage {
    /// Serialize to a text frame.
    ///
    /// Every variant is a plain JSON object, so this cannot fail in practice;
    /// the fallback keeps the relay loop free of panics.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize server message: {}", e);
            String::from(r#"{"type":"error","message":"serialization failure"}"#)
        })
    }
}
