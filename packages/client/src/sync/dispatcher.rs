//! Sync Dispatcher: the single choke point between local edits, history,
//! persistence and the relay.
//!
//! State machine:
//!
//! ```text
//! Idle --(classifier: sync now)--> SyncPending --(tick)--> Syncing --> Idle
//! ```
//!
//! `tick` returns the effects to run; the caller executes them fire-and-forget,
//! so the dispatcher is back in `Idle` before any of them completes. A remote
//! replace writes the store directly and never enters `SyncPending`.

use crate::domain::{
    Connection, EdgeChange, GraphError, GraphState, NodeChange, Viewport, XYPosition,
};

use super::classifier::{SyncDecision, classify_edge_changes, classify_node_changes};
use super::event::{RemoteUpdate, SyncEvent};
use super::history::{History, HistorySnapshot};
use super::store::LocalGraphStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    /// `record_history` is false for syncs caused by undo / redo / reset
    SyncPending { record_history: bool },
    Syncing,
}

/// Work produced by a tick
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEffect {
    /// Overwrite the durable chart with `{nodes, edges, viewport}`
    Persist {
        chart_id: String,
        state: serde_json::Value,
    },
    /// Emit to the room
    Broadcast(SyncEvent),
}

#[derive(Debug)]
pub struct SyncDispatcher {
    chart_id: String,
    room_id: String,
    store: LocalGraphStore,
    history: History,
    state: SyncState,
    loaded: bool,
}

impl SyncDispatcher {
    /// The room is named after the chart.
    pub fn new(chart_id: impl Into<String>, store: LocalGraphStore) -> Self {
        let chart_id = chart_id.into();
        let history = History::new(HistorySnapshot::capture(store.nodes(), store.edges()));
        Self {
            room_id: chart_id.clone(),
            chart_id,
            store,
            history,
            state: SyncState::Idle,
            loaded: false,
        }
    }

    pub fn chart_id(&self) -> &str {
        &self.chart_id
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Whether the initial load has completed. Until then no persistence
    /// write is issued.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn store(&self) -> &LocalGraphStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Seed from the loaded chart and enable persistence writes.
    pub fn seed(&mut self, graph: GraphState) {
        self.store.replace_graph(graph);
        self.history
            .reset_to(HistorySnapshot::capture(self.store.nodes(), self.store.edges()));
        self.loaded = true;
        self.state = SyncState::Idle;
        tracing::debug!(
            "Seeded chart {} with {} node(s), {} edge(s)",
            self.chart_id,
            self.store.nodes().len(),
            self.store.edges().len()
        );
    }

    pub fn on_node_changes(&mut self, changes: &[NodeChange]) -> SyncDecision {
        self.store.apply_node_changes(changes);
        let decision = classify_node_changes(changes);
        if decision.should_sync() {
            self.mark_pending(true);
        }
        decision
    }

    pub fn on_edge_changes(&mut self, changes: &[EdgeChange]) -> SyncDecision {
        self.store.apply_edge_changes(changes);
        let decision = classify_edge_changes(changes);
        if decision.should_sync() {
            self.mark_pending(true);
        }
        decision
    }

    /// Returns `false` when the connection already existed.
    pub fn connect(&mut self, connection: Connection) -> bool {
        let added = self.store.connect(connection).is_some();
        if added {
            self.mark_pending(true);
        }
        added
    }

    /// Returns the new node's id.
    pub fn add_node(&mut self, kind: &str, position: XYPosition) -> String {
        let id = self.store.add_node(kind, position).id().to_string();
        self.mark_pending(true);
        id
    }

    pub fn duplicate_node(&mut self, node_id: &str) -> Result<String, GraphError> {
        let id = self.store.duplicate_node(node_id)?.id().to_string();
        self.mark_pending(true);
        Ok(id)
    }

    pub fn update_node_text(&mut self, node_id: &str, text: &str) -> Result<(), GraphError> {
        self.store.update_node_text(node_id, text)?;
        self.mark_pending(true);
        Ok(())
    }

    /// Visual only; never syncs.
    pub fn select_all(&mut self) {
        self.store.select_all();
    }

    /// Travels with the next persistence write.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.store.set_viewport(viewport);
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.apply_history(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.apply_history(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        let snapshot = self.history.reset();
        self.apply_history(snapshot);
    }

    /// Replace the whole graph from a local source (fallback store or a
    /// restored snapshot) and sync it.
    pub fn restore(&mut self, graph: GraphState) {
        self.store.replace_graph(graph);
        self.mark_pending(true);
    }

    /// Apply a peer's state. Never routes through the classifier and never
    /// schedules an outbound sync; a pending local sync is superseded.
    pub fn apply_remote(&mut self, update: RemoteUpdate) {
        if let SyncState::SyncPending { .. } = self.state {
            tracing::debug!("Remote update supersedes pending local sync");
            self.state = SyncState::Idle;
        }
        self.store.replace(update.nodes, update.edges);
    }

    /// Run one pending sync, if any.
    pub fn tick(&mut self) -> Vec<SyncEffect> {
        let SyncState::SyncPending { record_history } = self.state else {
            return Vec::new();
        };
        self.transition(SyncState::Syncing);

        if record_history {
            self.history
                .push(HistorySnapshot::capture(self.store.nodes(), self.store.edges()));
        }

        let mut effects = Vec::with_capacity(2);
        if self.loaded {
            match serde_json::to_value(self.store.graph()) {
                Ok(state) => effects.push(SyncEffect::Persist {
                    chart_id: self.chart_id.clone(),
                    state,
                }),
                Err(e) => tracing::error!("Failed to encode chart state: {}", e),
            }
        } else {
            tracing::debug!("Chart {} not loaded yet, skipping persistence", self.chart_id);
        }
        effects.push(SyncEffect::Broadcast(SyncEvent {
            room_id: self.room_id.clone(),
            nodes: self.store.nodes().to_vec(),
            edges: self.store.edges().to_vec(),
        }));

        self.transition(SyncState::Idle);
        effects
    }

    fn apply_history(&mut self, snapshot: HistorySnapshot) {
        let (nodes, edges) = snapshot.into_parts();
        self.store.replace(nodes, edges);
        self.mark_pending(false);
    }

    fn mark_pending(&mut self, record_history: bool) {
        let record_history = match self.state {
            SyncState::SyncPending {
                record_history: already,
            } => already || record_history,
            _ => record_history,
        };
        self.transition(SyncState::SyncPending { record_history });
    }

    fn transition(&mut self, next: SyncState) {
        tracing::trace!("Sync state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
