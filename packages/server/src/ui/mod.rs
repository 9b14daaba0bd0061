//! UI layer: axum router, HTTP handlers and the WebSocket relay loop.

pub mod handler;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
