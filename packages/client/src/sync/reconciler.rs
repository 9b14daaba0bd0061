//! Persistence Reconciler: loads the durable chart into a dispatcher on open.

use std::sync::Arc;

use crate::domain::{ChartRepository, GraphState, RepositoryError};

use super::dispatcher::SyncDispatcher;

/// What the reconciler seeded
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedChart {
    pub title: String,
    pub graph: GraphState,
}

pub struct PersistenceReconciler {
    repository: Arc<dyn ChartRepository>,
}

impl PersistenceReconciler {
    pub fn new(repository: Arc<dyn ChartRepository>) -> Self {
        Self { repository }
    }

    /// Fetch the chart and decode its state. A missing or malformed `nodes`,
    /// `edges` or `viewport` decodes to its empty default.
    pub async fn load(&self, chart_id: &str) -> Result<LoadedChart, RepositoryError> {
        let chart = self.repository.get_chart(chart_id).await?;
        let graph = chart.graph();
        tracing::info!(
            "Loaded chart '{}' ({}): {} node(s), {} edge(s)",
            chart.title,
            chart.id,
            graph.nodes.len(),
            graph.edges.len()
        );
        Ok(LoadedChart {
            title: chart.title,
            graph,
        })
    }

    /// Load and seed. On failure the dispatcher is left untouched, so
    /// persistence writes stay disabled.
    pub async fn reconcile(
        &self,
        dispatcher: &mut SyncDispatcher,
    ) -> Result<LoadedChart, RepositoryError> {
        let loaded = self.load(dispatcher.chart_id()).await?;
        dispatcher.seed(loaded.graph.clone());
        Ok(loaded)
    }
}
