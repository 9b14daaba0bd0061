//! Client synchronization core.

pub mod classifier;
pub mod dispatcher;
pub mod event;
pub mod history;
pub mod reconciler;
pub mod store;

pub use classifier::{SyncDecision, classify_edge_changes, classify_node_changes};
pub use dispatcher::{SyncDispatcher, SyncEffect, SyncState};
pub use event::{RemoteUpdate, SyncEvent};
pub use history::{History, HistorySnapshot};
pub use reconciler::{LoadedChart, PersistenceReconciler};
pub use store::LocalGraphStore;
