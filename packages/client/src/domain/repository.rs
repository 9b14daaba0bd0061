//! Repository traits（永続化コラボレーターの抽象化）
//!
//! ドメイン層が定義し、インフラ層が HTTP / インメモリで実装します。

use async_trait::async_trait;
use serde_json::Value;

use super::{ChartSnapshot, PersistedChart, RepositoryError};

/// The chart persistence collaborator.
///
/// Charts are only ever read or overwritten wholesale.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChartRepository: Send + Sync {
    async fn create_chart(&self, title: &str) -> Result<PersistedChart, RepositoryError>;

    async fn get_chart(&self, chart_id: &str) -> Result<PersistedChart, RepositoryError>;

    /// Full overwrite of the chart's state
    async fn update_chart(&self, chart_id: &str, state: Value) -> Result<PersistedChart, RepositoryError>;

    async fn create_snapshot(
        &self,
        chart_id: &str,
        image: Option<String>,
    ) -> Result<ChartSnapshot, RepositoryError>;

    /// Newest first
    async fn get_snapshots(&self, chart_id: &str) -> Result<Vec<ChartSnapshot>, RepositoryError>;

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), RepositoryError>;

    /// Copy the snapshot's state back onto its chart and return the chart
    async fn restore_snapshot(&self, snapshot_id: &str) -> Result<PersistedChart, RepositoryError>;
}
