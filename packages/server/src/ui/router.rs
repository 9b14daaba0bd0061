//! Route table.

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        create_chart, create_snapshot, delete_chart, delete_snapshot, get_chart, get_room_detail,
        get_rooms, health_check, list_charts, list_snapshots, restore_snapshot, update_chart,
        websocket_handler,
    },
    state::AppState,
};

/// Snapshot bodies may carry a rendered image as a data URL.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/rooms", get(get_rooms))
        .route("/api/rooms/{room_id}", get(get_room_detail))
        .route("/api/charts", get(list_charts).post(create_chart))
        .route(
            "/api/charts/{chart_id}",
            get(get_chart).put(update_chart).delete(delete_chart),
        )
        .route(
            "/api/charts/{chart_id}/snapshots",
            get(list_snapshots).post(create_snapshot),
        )
        .route("/api/snapshots/{snapshot_id}", delete(delete_snapshot))
        .route("/api/snapshots/{snapshot_id}/restore", post(restore_snapshot))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
