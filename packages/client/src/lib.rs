//! Collaborative flowchart client.
//!
//! Holds the live graph of one open chart, throttles transient gestures,
//! keeps undo / redo history, and keeps the graph in sync with peers through
//! the relay and with the durable chart store.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod session;
pub mod sync;

pub use session::{ChartSession, MutationState, RelayLink};
