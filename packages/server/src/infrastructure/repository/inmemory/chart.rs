//! InMemory Chart Repository 実装
//!
//! チャートとスナップショットを HashMap に保持します。プロセス終了で消えるため、
//! 永続ストレージの代わりに開発・テスト用として使用します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Chart, ChartId, ChartIdFactory, ChartRepository, ChartSnapshot, ChartTitle, RepositoryError,
    SnapshotId, SnapshotIdFactory, Timestamp,
};

#[derive(Default)]
struct ChartTables {
    charts: HashMap<ChartId, Chart>,
    snapshots: HashMap<SnapshotId, ChartSnapshot>,
}

/// インメモリ Chart Repository 実装
#[derive(Default)]
pub struct InMemoryChartRepository {
    tables: Mutex<ChartTables>,
}

impl InMemoryChartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn chart_not_found(chart_id: &ChartId) -> RepositoryError {
    RepositoryError::ChartNotFound(chart_id.to_string())
}

#[async_trait]
impl ChartRepository for InMemoryChartRepository {
    async fn create_chart(&self, title: ChartTitle) -> Chart {
        let chart = Chart::new(ChartIdFactory::generate(), title, Timestamp::now());
        let mut tables = self.tables.lock().await;
        tables.charts.insert(chart.id.clone(), chart.clone());
        chart
    }

    async fn list_charts(&self) -> Vec<Chart> {
        let tables = self.tables.lock().await;
        let mut charts: Vec<Chart> = tables.charts.values().cloned().collect();
        charts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        charts
    }

    async fn get_chart(&self, chart_id: &ChartId) -> Result<Chart, RepositoryError> {
        let tables = self.tables.lock().await;
        tables
            .charts
            .get(chart_id)
            .cloned()
            .ok_or_else(|| chart_not_found(chart_id))
    }

    async fn update_chart_state(
        &self,
        chart_id: &ChartId,
        state: serde_json::Value,
    ) -> Result<Chart, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let chart = tables
            .charts
            .get_mut(chart_id)
            .ok_or_else(|| chart_not_found(chart_id))?;
        chart.replace_state(state, Timestamp::now());
        Ok(chart.clone())
    }

    async fn delete_chart(&self, chart_id: &ChartId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        tables
            .charts
            .remove(chart_id)
            .ok_or_else(|| chart_not_found(chart_id))?;
        tables.snapshots.retain(|_, s| &s.chart_id != chart_id);
        Ok(())
    }

    async fn create_snapshot(
        &self,
        chart_id: &ChartId,
        image_url: Option<String>,
    ) -> Result<ChartSnapshot, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let chart = tables
            .charts
            .get(chart_id)
            .ok_or_else(|| chart_not_found(chart_id))?;
        let snapshot = ChartSnapshot::capture(
            SnapshotIdFactory::generate(),
            chart,
            image_url,
            Timestamp::now(),
        );
        tables
            .snapshots
            .insert(snapshot.id.clone(), snapshot.clone());
        Ok(snapshot)
    }

    async fn list_snapshots(
        &self,
        chart_id: &ChartId,
    ) -> Result<Vec<ChartSnapshot>, RepositoryError> {
        let tables = self.tables.lock().await;
        if !tables.charts.contains_key(chart_id) {
            return Err(chart_not_found(chart_id));
        }
        let mut snapshots: Vec<ChartSnapshot> = tables
            .snapshots
            .values()
            .filter(|s| &s.chart_id == chart_id)
            .cloned()
            .collect();
        snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(snapshots)
    }

    async fn delete_snapshot(&self, snapshot_id: &SnapshotId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        tables
            .snapshots
            .remove(snapshot_id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::SnapshotNotFound(snapshot_id.to_string()))
    }

    async fn restore_snapshot(&self, snapshot_id: &SnapshotId) -> Result<Chart, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let snapshot = tables
            .snapshots
            .get(snapshot_id)
            .cloned()
            .ok_or_else(|| RepositoryError::SnapshotNotFound(snapshot_id.to_string()))?;
        let chart = tables
            .charts
            .get_mut(&snapshot.chart_id)
            .ok_or_else(|| chart_not_found(&snapshot.chart_id))?;
        chart.replace_state(snapshot.state, Timestamp::now());
        Ok(chart.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn repository_with_chart() -> (InMemoryChartRepository, Chart) {
        let repo = InMemoryChartRepository::new();
        let chart = repo
            .create_chart(ChartTitle::new("flow".to_string()).unwrap())
            .await;
        (repo, chart)
    }

    #[tokio::test]
    async fn test_create_chart_has_empty_state() {
        // テスト項目: 作成直後のチャートは空オブジェクトの state を持つ
        // when (操作):
        let (repo, chart) = repository_with_chart().await;

        // then (期待する結果):
        let stored = repo.get_chart(&chart.id).await.unwrap();
        assert_eq!(stored.state, json!({}));
        assert_eq!(stored.title.as_str(), "flow");
    }

    #[tokio::test]
    async fn test_update_chart_state_overwrites() {
        // テスト項目: updateChart は state を丸ごと上書きする
        // given (前提条件):
        let (repo, chart) = repository_with_chart().await;
        repo.update_chart_state(&chart.id, json!({"nodes": [{"id": "a"}], "edges": []}))
            .await
            .unwrap();

        // when (操作):
        let updated = repo
            .update_chart_state(&chart.id, json!({"nodes": []}))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(updated.state, json!({"nodes": []}));
    }

    #[tokio::test]
    async fn test_get_missing_chart_fails() {
        // テスト項目: 存在しないチャートの取得はエラーになる
        let repo = InMemoryChartRepository::new();

        let result = repo.get_chart(&ChartIdFactory::generate()).await;

        assert!(matches!(result, Err(RepositoryError::ChartNotFound(_))));
    }

    #[tokio::test]
    async fn test_restore_snapshot_copies_state_back() {
        // テスト項目: スナップショットの復元でチャートの state が戻る
        // given (前提条件):
        let (repo, chart) = repository_with_chart().await;
        repo.update_chart_state(&chart.id, json!({"nodes": ["v1"]}))
            .await
            .unwrap();
        let snapshot = repo.create_snapshot(&chart.id, None).await.unwrap();
        repo.update_chart_state(&chart.id, json!({"nodes": ["v2"]}))
            .await
            .unwrap();

        // when (操作):
        let restored = repo.restore_snapshot(&snapshot.id).await.unwrap();

        // then (期待する結果):
        assert_eq!(restored.state, json!({"nodes": ["v1"]}));
        assert_eq!(
            repo.get_chart(&chart.id).await.unwrap().state,
            json!({"nodes": ["v1"]})
        );
    }

    #[tokio::test]
    async fn test_delete_chart_drops_snapshots() {
        // テスト項目: チャート削除でスナップショットも削除される
        // given (前提条件):
        let (repo, chart) = repository_with_chart().await;
        let snapshot = repo.create_snapshot(&chart.id, None).await.unwrap();

        // when (操作):
        repo.delete_chart(&chart.id).await.unwrap();

        // then (期待する結果):
        assert!(matches!(
            repo.delete_snapshot(&snapshot.id).await,
            Err(RepositoryError::SnapshotNotFound(_))
        ));
        assert!(repo.list_charts().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_snapshots_only_for_chart() {
        // テスト項目: スナップショット一覧は対象チャートのものだけを返す
        // given (前提条件):
        let (repo, chart) = repository_with_chart().await;
        let other = repo
            .create_chart(ChartTitle::new("other".to_string()).unwrap())
            .await;
        repo.create_snapshot(&chart.id, Some("img".to_string()))
            .await
            .unwrap();
        repo.create_snapshot(&other.id, None).await.unwrap();

        // when (操作):
        let snapshots = repo.list_snapshots(&chart.id).await.unwrap();

        // then (期待する結果):
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].image_url.as_deref(), Some("img"));
    }
}
