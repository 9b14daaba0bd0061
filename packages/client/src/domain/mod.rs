//! Client domain: graph content, change descriptors, node behaviour and the
//! persistence collaborator's contract.

pub mod behavior;
pub mod change;
pub mod chart;
pub mod error;
pub mod graph;
pub mod repository;

pub use behavior::{BehaviorRegistry, INTERACTIVE_NODE_TYPES, NodeBehavior, TextEditHandler};
pub use change::{EdgeChange, NodeChange, apply_edge_changes, apply_node_changes, connect};
pub use chart::{ChartSnapshot, PersistedChart};
pub use error::{GraphError, LocalStoreError, RepositoryError, SessionError, TransportError};
pub use graph::{Connection, Dimensions, Edge, GraphState, Node, Viewport, XYPosition};
pub use repository::ChartRepository;
