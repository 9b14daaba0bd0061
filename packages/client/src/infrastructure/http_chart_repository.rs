//! Chart repository backed by the server's HTTP API.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{ChartRepository, ChartSnapshot, PersistedChart, RepositoryError};
use flowsync_server::infrastructure::dto::http::{
    ChartDto, CreateChartRequest, CreateSnapshotRequest, SnapshotDto, UpdateChartRequest,
};

pub struct HttpChartRepository {
    client: Client,
    base_url: String,
}

impl HttpChartRepository {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Which record a 404 refers to
#[derive(Clone, Copy)]
enum Target<'a> {
    Chart(&'a str),
    Snapshot(&'a str),
}

fn check(response: Response, target: Target<'_>) -> Result<Response, RepositoryError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(match target {
            Target::Chart(id) => RepositoryError::ChartNotFound(id.to_string()),
            Target::Snapshot(id) => RepositoryError::SnapshotNotFound(id.to_string()),
        }),
        status => Err(RepositoryError::Http(format!(
            "{} {}",
            status,
            response.url().path()
        ))),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RepositoryError> {
    response
        .json::<T>()
        .await
        .map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn transport(e: reqwest::Error) -> RepositoryError {
    RepositoryError::Http(e.to_string())
}

fn chart_from_dto(dto: ChartDto) -> PersistedChart {
    PersistedChart {
        id: dto.id,
        title: dto.title,
        state: dto.state,
        created_at: dto.created_at,
        updated_at: dto.updated_at,
    }
}

fn snapshot_from_dto(dto: SnapshotDto) -> ChartSnapshot {
    ChartSnapshot {
        id: dto.id,
        chart_id: dto.chart_id,
        state: dto.state,
        image_url: dto.image_url,
        created_at: dto.created_at,
    }
}

#[async_trait]
impl ChartRepository for HttpChartRepository {
    async fn create_chart(&self, title: &str) -> Result<PersistedChart, RepositoryError> {
        let response = self
            .client
            .post(self.url("/api/charts"))
            .json(&CreateChartRequest {
                title: title.to_string(),
            })
            .send()
            .await
            .map_err(transport)?;
        let response = check(response, Target::Chart(""))?;
        decode::<ChartDto>(response).await.map(chart_from_dto)
    }

    async fn get_chart(&self, chart_id: &str) -> Result<PersistedChart, RepositoryError> {
        let response = self
            .client
            .get(self.url(&format!("/api/charts/{chart_id}")))
            .send()
            .await
            .map_err(transport)?;
        let response = check(response, Target::Chart(chart_id))?;
        decode::<ChartDto>(response).await.map(chart_from_dto)
    }

    async fn update_chart(&self, chart_id: &str, state: Value) -> Result<PersistedChart, RepositoryError> {
        let response = self
            .client
            .put(self.url(&format!("/api/charts/{chart_id}")))
            .json(&UpdateChartRequest { state })
            .send()
            .await
            .map_err(transport)?;
        let response = check(response, Target::Chart(chart_id))?;
        decode::<ChartDto>(response).await.map(chart_from_dto)
    }

    async fn create_snapshot(
        &self,
        chart_id: &str,
        image: Option<String>,
    ) -> Result<ChartSnapshot, RepositoryError> {
        let response = self
            .client
            .post(self.url(&format!("/api/charts/{chart_id}/snapshots")))
            .json(&CreateSnapshotRequest { image })
            .send()
            .await
            .map_err(transport)?;
        let response = check(response, Target::Chart(chart_id))?;
        decode::<SnapshotDto>(response).await.map(snapshot_from_dto)
    }

    async fn get_snapshots(&self, chart_id: &str) -> Result<Vec<ChartSnapshot>, RepositoryError> {
        let response = self
            .client
            .get(self.url(&format!("/api/charts/{chart_id}/snapshots")))
            .send()
            .await
            .map_err(transport)?;
        let response = check(response, Target::Chart(chart_id))?;
        let snapshots: Vec<SnapshotDto> = decode(response).await?;
        Ok(snapshots.into_iter().map(snapshot_from_dto).collect())
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), RepositoryError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/snapshots/{snapshot_id}")))
            .send()
            .await
            .map_err(transport)?;
        check(response, Target::Snapshot(snapshot_id))?;
        Ok(())
    }

    async fn restore_snapshot(&self, snapshot_id: &str) -> Result<PersistedChart, RepositoryError> {
        let response = self
            .client
            .post(self.url(&format!("/api/snapshots/{snapshot_id}/restore")))
            .send()
            .await
            .map_err(transport)?;
        let response = check(response, Target::Snapshot(snapshot_id))?;
        decode::<ChartDto>(response).await.map(chart_from_dto)
    }
}
