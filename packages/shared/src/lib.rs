//! Shared utilities for Flowsync.
//!
//! Logger bootstrap and timestamp helpers used by both the relay server and
//! the collaborative client.

pub mod logger;
pub mod time;
