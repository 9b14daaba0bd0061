//! Repository traits（データアクセス層の抽象化）
//!
//! ドメイン層が定義し、インフラ層が実装します（依存性の逆転）。

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use super::{
    Chart, ChartId, ChartSnapshot, ChartTitle, ConnectionId, RepositoryError, Room, RoomId,
    SnapshotId, Timestamp,
};

/// Room membership and per-connection outbound channels.
///
/// Implementations must serialize join / leave / lookups so that concurrent
/// connections never lose a membership update.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Register a live connection and the channel used to push frames to it
    async fn register_connection(
        &self,
        connection_id: ConnectionId,
        sender: UnboundedSender<String>,
    ) -> Result<(), RepositoryError>;

    /// Drop a connection and remove it from every room it had joined.
    ///
    /// Returns the post-leave state of each of those rooms. Rooms left empty
    /// are already destroyed but still reported (with no members).
    async fn unregister_connection(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Vec<Room>, RepositoryError>;

    /// Add the connection to the room, creating the room on first join.
    /// Returns the post-join room.
    async fn join_room(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        timestamp: Timestamp,
    ) -> Result<Room, RepositoryError>;

    /// Remove the connection from the room. Returns the post-leave room, or
    /// `None` when the room no longer exists.
    async fn leave_room(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<Option<Room>, RepositoryError>;

    async fn get_room(&self, room_id: &RoomId) -> Option<Room>;

    async fn list_rooms(&self) -> Vec<Room>;

    /// Outbound channel of a connection, if it is still registered
    async fn get_sender(&self, connection_id: &ConnectionId) -> Option<UnboundedSender<String>>;

    async fn count_connections(&self) -> usize;
}

/// Durable chart storage. Charts are only ever read or replaced wholesale.
#[async_trait]
pub trait ChartRepository: Send + Sync {
    async fn create_chart(&self, title: ChartTitle) -> Chart;

    async fn list_charts(&self) -> Vec<Chart>;

    async fn get_chart(&self, chart_id: &ChartId) -> Result<Chart, RepositoryError>;

    /// Full overwrite of the chart's state
    async fn update_chart_state(
        &self,
        chart_id: &ChartId,
        state: serde_json::Value,
    ) -> Result<Chart, RepositoryError>;

    /// Delete the chart together with its snapshots
    async fn delete_chart(&self, chart_id: &ChartId) -> Result<(), RepositoryError>;

    async fn create_snapshot(
        &self,
        chart_id: &ChartId,
        image_url: Option<String>,
    ) -> Result<ChartSnapshot, RepositoryError>;

    /// Snapshots of a chart, newest first
    async fn list_snapshots(&self, chart_id: &ChartId)
    -> Result<Vec<ChartSnapshot>, RepositoryError>;

    async fn delete_snapshot(&self, snapshot_id: &SnapshotId) -> Result<(), RepositoryError>;

    /// Copy a snapshot's state back onto its chart and return the chart
    async fn restore_snapshot(&self, snapshot_id: &SnapshotId) -> Result<Chart, RepositoryError>;
}
