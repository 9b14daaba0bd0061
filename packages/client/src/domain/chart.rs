//! Durable chart records as seen by the client.

use serde_json::Value;

use super::graph::GraphState;

/// `{id, title, state, createdAt, updatedAt}`
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedChart {
    pub id: String,
    pub title: String,
    pub state: Value,
    pub created_at: String,
    pub updated_at: String,
}

impl PersistedChart {
    pub fn graph(&self) -> GraphState {
        GraphState::from_value(&self.state)
    }
}

/// A user-invoked checkpoint of a chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSnapshot {
    pub id: String,
    pub chart_id: String,
    pub state: Value,
    pub image_url: Option<String>,
    pub created_at: String,
}

impl ChartSnapshot {
    pub fn graph(&self) -> GraphState {
        GraphState::from_value(&self.state)
    }
}
