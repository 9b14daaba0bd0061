//! Chart session: drives the sync core for one open chart.
//!
//! Local edits go through the dispatcher; `flush` runs one tick and executes
//! the resulting effects as spawned, fire-and-forget tasks. Persistence
//! outcomes are published on a `watch` channel and never roll back local
//! edits. Relay failures are only logged.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

use crate::domain::{
    ChartRepository, ChartSnapshot, Connection, EdgeChange, GraphError, NodeChange,
    RepositoryError, SessionError, Viewport, XYPosition,
};
use crate::infrastructure::{LocalFlowStore, RelayConnection, RelayEvent};
use crate::sync::{
    LoadedChart, LocalGraphStore, PersistenceReconciler, SyncDecision, SyncDispatcher, SyncEffect,
};

/// Upper bound on a single persistence write
pub const PERSIST_TIMEOUT: Duration = Duration::from_millis(5000);

/// Outcome of the most recent persistence write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationState {
    Idle,
    Pending,
    Saved,
    Failed(String),
}

/// The relay handle together with its event stream
pub struct RelayLink {
    pub connection: RelayConnection,
    pub events: mpsc::UnboundedReceiver<RelayEvent>,
}

pub struct ChartSession {
    dispatcher: SyncDispatcher,
    repository: Arc<dyn ChartRepository>,
    relay: Option<RelayLink>,
    local: LocalFlowStore,
    title: String,
    user_count: usize,
    mutation_tx: watch::Sender<MutationState>,
    tasks: JoinSet<()>,
}

impl ChartSession {
    /// Join the chart's room without loading it. Edits made before `load`
    /// are broadcast but not persisted.
    pub fn connect(
        chart_id: impl Into<String>,
        repository: Arc<dyn ChartRepository>,
        relay: Option<RelayLink>,
        local: LocalFlowStore,
    ) -> Self {
        let dispatcher = SyncDispatcher::new(chart_id, LocalGraphStore::default());
        let (mutation_tx, _) = watch::channel(MutationState::Idle);
        let mut session = Self {
            dispatcher,
            repository,
            relay,
            local,
            title: String::new(),
            user_count: 0,
            mutation_tx,
            tasks: JoinSet::new(),
        };
        if let Some(link) = &session.relay {
            let handle = link.connection.spawn_join_room(session.dispatcher.room_id());
            session.tasks.spawn(async move {
                let _ = handle.await;
            });
        }
        session
    }

    /// Load the durable chart and enable persistence writes.
    pub async fn load(&mut self) -> Result<LoadedChart, SessionError> {
        let reconciler = PersistenceReconciler::new(self.repository.clone());
        let loaded = reconciler.reconcile(&mut self.dispatcher).await?;
        self.title = loaded.title.clone();
        Ok(loaded)
    }

    /// `connect` followed by `load`.
    pub async fn open(
        chart_id: impl Into<String>,
        repository: Arc<dyn ChartRepository>,
        relay: Option<RelayLink>,
        local: LocalFlowStore,
    ) -> Result<Self, SessionError> {
        let mut session = Self::connect(chart_id, repository, relay, local);
        session.load().await?;
        Ok(session)
    }

    pub fn chart_id(&self) -> &str {
        self.dispatcher.chart_id()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn has_relay(&self) -> bool {
        self.relay.is_some()
    }

    pub fn user_count(&self) -> usize {
        self.user_count
    }

    pub fn store(&self) -> &LocalGraphStore {
        self.dispatcher.store()
    }

    pub fn dispatcher(&self) -> &SyncDispatcher {
        &self.dispatcher
    }

    pub fn mutation_state(&self) -> MutationState {
        self.mutation_tx.borrow().clone()
    }

    pub fn subscribe_mutations(&self) -> watch::Receiver<MutationState> {
        self.mutation_tx.subscribe()
    }

    // Local edits

    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) -> SyncDecision {
        self.dispatcher.on_node_changes(changes)
    }

    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) -> SyncDecision {
        self.dispatcher.on_edge_changes(changes)
    }

    pub fn connect_nodes(&mut self, connection: Connection) -> bool {
        self.dispatcher.connect(connection)
    }

    pub fn add_node(&mut self, kind: &str, position: XYPosition) -> String {
        self.dispatcher.add_node(kind, position)
    }

    /// Copy a node next to itself. Returns the new node's id.
    pub fn duplicate_node(&mut self, node_id: &str) -> Result<String, GraphError> {
        self.dispatcher.duplicate_node(node_id)
    }

    pub fn update_node_text(&mut self, node_id: &str, text: &str) -> Result<(), GraphError> {
        self.dispatcher.update_node_text(node_id, text)
    }

    pub fn select_all(&mut self) {
        self.dispatcher.select_all();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.dispatcher.set_viewport(viewport);
    }

    pub fn undo(&mut self) -> bool {
        self.dispatcher.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.dispatcher.redo()
    }

    pub fn reset(&mut self) {
        self.dispatcher.reset();
    }

    /// Run one dispatcher tick and launch its effects. Returns how many were
    /// launched.
    pub fn flush(&mut self) -> usize {
        self.reap_finished();
        let effects = self.dispatcher.tick();
        let launched = effects.len();
        for effect in effects {
            match effect {
                SyncEffect::Persist { chart_id, state } => self.spawn_persist(chart_id, state),
                SyncEffect::Broadcast(event) => match &self.relay {
                    Some(link) => {
                        let handle = link.connection.spawn_emit_chart_updated(event);
                        self.tasks.spawn(async move {
                            let _ = handle.await;
                        });
                    }
                    None => tracing::debug!("No relay attached, broadcast skipped"),
                },
            }
        }
        launched
    }

    fn spawn_persist(&mut self, chart_id: String, state: serde_json::Value) {
        let repository = self.repository.clone();
        let mutation_tx = self.mutation_tx.clone();
        mutation_tx.send_replace(MutationState::Pending);
        self.tasks.spawn(async move {
            let outcome =
                match tokio::time::timeout(PERSIST_TIMEOUT, repository.update_chart(&chart_id, state)).await {
                    Ok(Ok(_)) => MutationState::Saved,
                    Ok(Err(e)) => MutationState::Failed(e.to_string()),
                    Err(_) => MutationState::Failed(
                        RepositoryError::Timeout(PERSIST_TIMEOUT.as_millis() as u64).to_string(),
                    ),
                };
            if let MutationState::Failed(reason) = &outcome {
                tracing::warn!("Persisting chart {} failed: {}", chart_id, reason);
            } else {
                tracing::debug!("Chart {} persisted", chart_id);
            }
            mutation_tx.send_replace(outcome);
        });
    }

    fn reap_finished(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            if let Err(e) = joined {
                tracing::error!("Sync task panicked: {}", e);
            }
        }
    }

    /// Wait for every launched effect to finish.
    pub async fn settle(&mut self) {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Sync task panicked: {}", e);
            }
        }
    }

    // Relay events

    /// Apply one relay event to the session.
    pub fn handle_event(&mut self, event: RelayEvent) {
        match event {
            RelayEvent::UserCount(count) => {
                tracing::debug!("Room {} occupancy: {}", self.dispatcher.room_id(), count);
                self.user_count = count;
            }
            RelayEvent::ChartUpdated(update) => {
                tracing::debug!(
                    "Applying remote update: {} node(s), {} edge(s)",
                    update.nodes.len(),
                    update.edges.len()
                );
                self.dispatcher.apply_remote(update);
            }
            RelayEvent::Disconnected => {
                tracing::warn!("Relay disconnected from room {}", self.dispatcher.room_id());
            }
        }
    }

    /// Apply every event already queued. Returns how many were applied.
    pub fn poll_events(&mut self) -> usize {
        let mut queued = Vec::new();
        if let Some(link) = &mut self.relay {
            while let Ok(event) = link.events.try_recv() {
                queued.push(event);
            }
        }
        let count = queued.len();
        queued.into_iter().for_each(|e| self.handle_event(e));
        count
    }

    /// Wait up to `wait` for the next event, apply it, and return a copy.
    pub async fn next_event(&mut self, wait: Duration) -> Option<RelayEvent> {
        let link = self.relay.as_mut()?;
        let event = tokio::time::timeout(wait, link.events.recv()).await.ok()??;
        self.handle_event(event.clone());
        Some(event)
    }

    // Snapshots

    pub async fn create_snapshot(&self, image: Option<String>) -> Result<ChartSnapshot, SessionError> {
        Ok(self
            .repository
            .create_snapshot(self.dispatcher.chart_id(), image)
            .await?)
    }

    pub async fn list_snapshots(&self) -> Result<Vec<ChartSnapshot>, SessionError> {
        Ok(self.repository.get_snapshots(self.dispatcher.chart_id()).await?)
    }

    pub async fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), SessionError> {
        Ok(self.repository.delete_snapshot(snapshot_id).await?)
    }

    /// Copy the snapshot onto the chart, replace the local graph with the
    /// result, and queue a sync so peers follow.
    pub async fn restore_snapshot(&mut self, snapshot_id: &str) -> Result<(), SessionError> {
        let chart = self.repository.restore_snapshot(snapshot_id).await?;
        tracing::info!("Restored snapshot {} onto chart {}", snapshot_id, chart.id);
        self.dispatcher.restore(chart.graph());
        Ok(())
    }

    // Local fallback

    pub async fn save_local(&self) -> Result<(), SessionError> {
        Ok(self.local.save(self.dispatcher.store().graph()).await?)
    }

    pub async fn restore_local(&mut self) -> Result<(), SessionError> {
        let graph = self.local.restore().await?;
        self.dispatcher.restore(graph);
        Ok(())
    }

    /// Leave the room, wait for in-flight effects, and close the socket.
    pub async fn close(mut self) {
        if let Some(link) = &self.relay {
            if let Err(e) = link.connection.leave_room(self.dispatcher.room_id()).await {
                tracing::warn!("leave-room failed: {}", e);
            }
        }
        self.settle().await;
        if let Some(link) = self.relay.take() {
            link.connection.close().await;
        }
    }
}
