//! Core domain models for the room relay and chart store.

use serde::{Deserialize, Serialize};

use super::value_object::{ChartId, ChartTitle, ConnectionId, RoomId, SnapshotId, Timestamp};

/// A named broadcast domain.
///
/// Membership is owned by the relay process and never persisted. A room
/// exists while it has at least one member; the repository drops it once the
/// last member leaves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Room identifier
    pub id: RoomId,
    /// Connections currently joined, in join order
    pub members: Vec<ConnectionId>,
    /// Timestamp when the room was created (first join)
    pub created_at: Timestamp,
}

impl Room {
    /// Create a new empty room with the given ID and creation timestamp
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            members: Vec::new(),
            created_at,
        }
    }

    /// Add a member. Returns `false` if the connection was already joined.
    pub fn join(&mut self, connection_id: ConnectionId) -> bool {
        if self.contains(&connection_id) {
            return false;
        }
        self.members.push(connection_id);
        true
    }

    /// Remove a member. Returns `false` if the connection was not joined.
    pub fn leave(&mut self, connection_id: &ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != connection_id);
        self.members.len() != before
    }

    /// Whether the connection is a member of this room
    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.members.iter().any(|m| m == connection_id)
    }

    /// Current member count
    pub fn occupancy(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Every member except the sender.
    pub fn broadcast_targets(&self, sender: &ConnectionId) -> Vec<ConnectionId> {
        self.members
            .iter()
            .filter(|m| *m != sender)
            .cloned()
            .collect()
    }
}

/// Durable chart record. `state` is the opaque graph JSON written by clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chart {
    pub id: ChartId,
    pub title: ChartTitle,
    pub state: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Chart {
    /// Create a chart with an empty state object
    pub fn new(id: ChartId, title: ChartTitle, created_at: Timestamp) -> Self {
        Self {
            id,
            title,
            state: serde_json::Value::Object(serde_json::Map::new()),
            created_at,
            updated_at: created_at,
        }
    }

    /// Overwrite the whole state. Never patched field by field.
    pub fn replace_state(&mut self, state: serde_json::Value, updated_at: Timestamp) {
        self.state = state;
        self.updated_at = updated_at;
    }
}

/// Point-in-time copy of a chart's state, optionally with a rendered image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSnapshot {
    pub id: SnapshotId,
    pub chart_id: ChartId,
    pub state: serde_json::Value,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
}

impl ChartSnapshot {
    /// Capture the current state of `chart`
    pub fn capture(
        id: SnapshotId,
        chart: &Chart,
        image_url: Option<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            chart_id: chart.id.clone(),
            state: chart.state.clone(),
            image_url,
            created_at,
        }
    }
}
