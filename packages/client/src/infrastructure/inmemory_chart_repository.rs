//! In-process chart repository.
//!
//! Keeps charts in a `Mutex<HashMap>` the way the server's in-memory store
//! does. Used for offline sessions and tests; it also counts writes so tests
//! can assert on persistence traffic.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::{ChartRepository, ChartSnapshot, PersistedChart, RepositoryError};
use flowsync_shared::time::{get_jst_timestamp, timestamp_to_jst_rfc3339};

#[derive(Default)]
struct Tables {
    charts: HashMap<String, PersistedChart>,
    snapshots: Vec<ChartSnapshot>,
    writes: usize,
}

#[derive(Default)]
pub struct InMemoryChartRepository {
    tables: Mutex<Tables>,
}

impl InMemoryChartRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a chart with a known id
    pub async fn insert(&self, chart: PersistedChart) {
        self.tables.lock().await.charts.insert(chart.id.clone(), chart);
    }

    /// Number of `update_chart` calls that succeeded
    pub async fn write_count(&self) -> usize {
        self.tables.lock().await.writes
    }
}

fn now() -> String {
    timestamp_to_jst_rfc3339(get_jst_timestamp())
}

#[async_trait]
impl ChartRepository for InMemoryChartRepository {
    async fn create_chart(&self, title: &str) -> Result<PersistedChart, RepositoryError> {
        let created_at = now();
        let chart = PersistedChart {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            state: Value::Object(Default::default()),
            created_at: created_at.clone(),
            updated_at: created_at,
        };
        self.insert(chart.clone()).await;
        Ok(chart)
    }

    async fn get_chart(&self, chart_id: &str) -> Result<PersistedChart, RepositoryError> {
        self.tables
            .lock()
            .await
            .charts
            .get(chart_id)
            .cloned()
            .ok_or_else(|| RepositoryError::ChartNotFound(chart_id.to_string()))
    }

    async fn update_chart(&self, chart_id: &str, state: Value) -> Result<PersistedChart, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let chart = tables
            .charts
            .get_mut(chart_id)
            .ok_or_else(|| RepositoryError::ChartNotFound(chart_id.to_string()))?;
        chart.state = state;
        chart.updated_at = now();
        let chart = chart.clone();
        tables.writes += 1;
        Ok(chart)
    }

    async fn create_snapshot(
        &self,
        chart_id: &str,
        image: Option<String>,
    ) -> Result<ChartSnapshot, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let state = tables
            .charts
            .get(chart_id)
            .map(|c| c.state.clone())
            .ok_or_else(|| RepositoryError::ChartNotFound(chart_id.to_string()))?;
        let snapshot = ChartSnapshot {
            id: uuid::Uuid::new_v4().to_string(),
            chart_id: chart_id.to_string(),
            state,
            image_url: image,
            created_at: now(),
        };
        tables.snapshots.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn get_snapshots(&self, chart_id: &str) -> Result<Vec<ChartSnapshot>, RepositoryError> {
        let tables = self.tables.lock().await;
        if !tables.charts.contains_key(chart_id) {
            return Err(RepositoryError::ChartNotFound(chart_id.to_string()));
        }
        Ok(tables
            .snapshots
            .iter()
            .rev()
            .filter(|s| s.chart_id == chart_id)
            .cloned()
            .collect())
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        let before = tables.snapshots.len();
        tables.snapshots.retain(|s| s.id != snapshot_id);
        if tables.snapshots.len() == before {
            return Err(RepositoryError::SnapshotNotFound(snapshot_id.to_string()));
        }
        Ok(())
    }

    async fn restore_snapshot(&self, snapshot_id: &str) -> Result<PersistedChart, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let snapshot = tables
            .snapshots
            .iter()
            .find(|s| s.id == snapshot_id)
            .cloned()
            .ok_or_else(|| RepositoryError::SnapshotNotFound(snapshot_id.to_string()))?;
        let chart = tables
            .charts
            .get_mut(&snapshot.chart_id)
            .ok_or_else(|| RepositoryError::ChartNotFound(snapshot.chart_id.clone()))?;
        chart.state = snapshot.state;
        chart.updated_at = now();
        Ok(chart.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_update_overwrites_state() {
        // テスト項目: update_chart は状態を丸ごと上書きし、書き込み回数を数える
        // given (前提条件):
        let repo = InMemoryChartRepository::new();
        let chart = repo.create_chart("Flow").await.unwrap();

        // when (操作):
        repo.update_chart(&chart.id, json!({"nodes": [1]})).await.unwrap();
        let updated = repo.update_chart(&chart.id, json!({"edges": []})).await.unwrap();

        // then (期待する結果):
        assert_eq!(updated.state, json!({"edges": []}));
        assert_eq!(repo.write_count().await, 2);
    }

    #[tokio::test]
    async fn test_snapshot_restore_cycle() {
        // テスト項目: スナップショットを取り、状態変更後に復元できる
        // given (前提条件):
        let repo = InMemoryChartRepository::new();
        let chart = repo.create_chart("Flow").await.unwrap();
        repo.update_chart(&chart.id, json!({"nodes": ["v1"]})).await.unwrap();
        let snapshot = repo.create_snapshot(&chart.id, Some("img.png".to_string())).await.unwrap();
        repo.update_chart(&chart.id, json!({"nodes": ["v2"]})).await.unwrap();

        // when (操作):
        let restored = repo.restore_snapshot(&snapshot.id).await.unwrap();

        // then (期待する結果):
        assert_eq!(restored.state, json!({"nodes": ["v1"]}));
        assert_eq!(repo.get_snapshots(&chart.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_snapshots_newest_first_and_delete() {
        // テスト項目: スナップショットは新しい順に並び、削除できる
        let repo = InMemoryChartRepository::new();
        let chart = repo.create_chart("Flow").await.unwrap();
        let first = repo.create_snapshot(&chart.id, None).await.unwrap();
        let second = repo.create_snapshot(&chart.id, None).await.unwrap();

        let listed = repo.get_snapshots(&chart.id).await.unwrap();
        assert_eq!(listed[0].id, second.id);

        repo.delete_snapshot(&first.id).await.unwrap();
        assert_eq!(
            repo.delete_snapshot(&first.id).await,
            Err(RepositoryError::SnapshotNotFound(first.id.clone()))
        );
        assert_eq!(repo.get_snapshots(&chart.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_chart() {
        // テスト項目: 存在しないチャートは ChartNotFound
        let repo = InMemoryChartRepository::new();

        assert_eq!(
            repo.get_chart("nope").await,
            Err(RepositoryError::ChartNotFound("nope".to_string()))
        );
        assert!(repo.update_chart("nope", json!({})).await.is_err());
    }
}
