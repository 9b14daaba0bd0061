//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// ConnectionId validation error
    #[error("ConnectionId cannot be empty")]
    ConnectionIdEmpty,

    /// RoomId validation error
    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    /// RoomId too long error
    #[error("RoomId cannot exceed {max} characters (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    /// ChartId / SnapshotId invalid format error (not a valid UUID format)
    #[error("{kind} must be a valid UUID format (got: {value})")]
    InvalidUuid { kind: &'static str, value: String },

    /// Chart title too long error
    #[error("Chart title cannot exceed {max} characters (got {actual})")]
    ChartTitleTooLong { max: usize, actual: usize },
}

/// Errors raised by repositories
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The connection was never registered or has already been dropped
    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    /// No chart with the given id
    #[error("Chart not found: {0}")]
    ChartNotFound(String),

    /// No snapshot with the given id
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),
}
