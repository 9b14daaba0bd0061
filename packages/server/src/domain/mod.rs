//! Domain layer for the collaboration relay.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod value_object;

pub use entity::{Chart, ChartSnapshot, Room};
pub use error::{RepositoryError, ValueObjectError};
pub use factory::{ChartIdFactory, ConnectionIdFactory, SnapshotIdFactory};
pub use repository::{ChartRepository, RoomRepository};
pub use value_object::{ChartId, ChartTitle, ConnectionId, RoomId, SnapshotId, Timestamp};
