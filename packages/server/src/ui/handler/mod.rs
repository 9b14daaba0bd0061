//! Handler modules for HTTP and WebSocket endpoints.

pub mod http;
pub mod websocket;

// Re-export HTTP handlers
pub use http::{
    create_chart, create_snapshot, delete_chart, delete_snapshot, get_chart, get_room_detail,
    get_rooms, health_check, list_charts, list_snapshots, restore_snapshot, update_chart,
};

// Re-export WebSocket handlers
pub use websocket::websocket_handler;
