//! Local fallback persistence: the full graph as a JSON file under a fixed
//! key, independent of the network path.

use std::path::{Path, PathBuf};

use crate::domain::{GraphState, LocalStoreError};

/// Fixed key of the saved flow
pub const FLOW_KEY: &str = "example-flow";

#[derive(Debug, Clone)]
pub struct LocalFlowStore {
    path: PathBuf,
}

impl LocalFlowStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{FLOW_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn save(&self, graph: &GraphState) -> Result<(), LocalStoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(graph)?;
        tokio::fs::write(&self.path, body).await?;
        tracing::info!("Saved flow to {}", self.path.display());
        Ok(())
    }

    /// Load the saved flow. A missing viewport restores as `{0, 0, 1}`.
    pub async fn restore(&self) -> Result<GraphState, LocalStoreError> {
        let body = match tokio::fs::read(&self.path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LocalStoreError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        let value: serde_json::Value = serde_json::from_slice(&body)?;
        Ok(GraphState::from_value(&value))
    }
}
