//! Collaborative flowchart relay server.
//!
//! A room-scoped broadcast relay for full-state chart updates, plus an
//! in-memory chart store exposed over HTTP.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod runner;
pub mod signal;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use runner::{ServerError, run as run_server, serve};
