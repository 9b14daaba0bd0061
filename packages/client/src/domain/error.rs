//! Client error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from local graph edits
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// The node's type has no text-edit behaviour attached
    #[error("Node '{0}' is not text-editable")]
    NotEditable(String),
}

/// Errors from the chart persistence collaborator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Chart not found: {0}")]
    ChartNotFound(String),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    /// The request was rejected or never reached the server
    #[error("Persistence request failed: {0}")]
    Http(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Persistence request timed out after {0} ms")]
    Timeout(u64),
}

/// Errors on the relay connection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Failed to connect to relay: {0}")]
    Connect(String),

    #[error("Relay connection is closed")]
    Closed,

    #[error("No acknowledgement for request {ack_id} within {timeout_ms} ms")]
    AckTimeout { ack_id: u64, timeout_ms: u64 },

    /// The relay answered with an error frame
    #[error("Relay rejected request: {0}")]
    Rejected(String),

    #[error("Failed to encode frame: {0}")]
    Encode(String),
}

/// Errors from the local fallback store
#[derive(Debug, Error)]
pub enum LocalStoreError {
    #[error("No saved flow at {0}")]
    NotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by a chart session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    LocalStore(#[from] LocalStoreError),
}
