//! Server state shared by every handler.

use std::sync::Arc;

use crate::{
    domain::{ChartRepository, RoomRepository},
    infrastructure::repository::{InMemoryChartRepository, InMemoryRoomRepository},
};

/// Shared application state
pub struct AppState {
    /// Room membership and per-connection outbound channels
    pub room_repository: Arc<dyn RoomRepository>,
    /// Chart persistence collaborator
    pub chart_repository: Arc<dyn ChartRepository>,
}

impl AppState {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        chart_repository: Arc<dyn ChartRepository>,
    ) -> Self {
        Self {
            room_repository,
            chart_repository,
        }
    }

    /// State backed by the in-memory repositories
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryRoomRepository::new()),
            Arc::new(InMemoryChartRepository::new()),
        )
    }
}
