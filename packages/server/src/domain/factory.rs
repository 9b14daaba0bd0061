//! Domain factories for creating identifiers.

use super::{ChartId, ConnectionId, SnapshotId};

/// Factory for generating ConnectionId instances (UUID v4).
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// Generate a new ConnectionId with a random UUID v4.
    pub fn generate() -> ConnectionId {
        ConnectionId::from_uuid(uuid::Uuid::new_v4())
    }
}

/// Factory for generating ChartId instances (UUID v4).
pub struct ChartIdFactory;

impl ChartIdFactory {
    /// Generate a new ChartId with a random UUID v4.
    pub fn generate() -> ChartId {
        ChartId::from_uuid(uuid::Uuid::new_v4())
    }
}

/// Factory for generating SnapshotId instances (UUID v4).
pub struct SnapshotIdFactory;

impl SnapshotIdFactory {
    /// Generate a new SnapshotId with a random UUID v4.
    pub fn generate() -> SnapshotId {
        SnapshotId::from_uuid(uuid::Uuid::new_v4())
    }
}
