//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{ChartId, ChartTitle, RepositoryError, RoomId, SnapshotId},
    infrastructure::dto::http::{
        ChartDto, ChartSummaryDto, CreateChartRequest, CreateSnapshotRequest, RoomDetailDto,
        RoomSummaryDto, SnapshotDto, UpdateChartRequest,
    },
    ui::state::AppState,
};

fn repository_status(e: RepositoryError) -> StatusCode {
    tracing::debug!("Repository lookup failed: {}", e);
    StatusCode::NOT_FOUND
}

fn parse_chart_id(raw: String) -> Result<ChartId, StatusCode> {
    ChartId::new(raw).map_err(|e| {
        tracing::warn!("{}", e);
        StatusCode::BAD_REQUEST
    })
}

fn parse_snapshot_id(raw: String) -> Result<SnapshotId, StatusCode> {
    SnapshotId::new(raw).map_err(|e| {
        tracing::warn!("{}", e);
        StatusCode::BAD_REQUEST
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of live rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.room_repository.list_rooms().await;
    Json(rooms.iter().map(RoomSummaryDto::from).collect())
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::BAD_REQUEST)?;
    let room = state
        .room_repository
        .get_room(&room_id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(RoomDetailDto::from(&room)))
}

/// Create a chart with an empty state
pub async fn create_chart(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateChartRequest>,
) -> Result<(StatusCode, Json<ChartDto>), StatusCode> {
    let title = ChartTitle::new(request.title).map_err(|e| {
        tracing::warn!("{}", e);
        StatusCode::BAD_REQUEST
    })?;
    let chart = state.chart_repository.create_chart(title).await;
    tracing::info!("Created chart '{}'", chart.id);
    Ok((StatusCode::CREATED, Json(ChartDto::from(&chart))))
}

/// List charts, most recently updated first
pub async fn list_charts(State(state): State<Arc<AppState>>) -> Json<Vec<ChartSummaryDto>> {
    let charts = state.chart_repository.list_charts().await;
    Json(charts.iter().map(ChartSummaryDto::from).collect())
}

pub async fn get_chart(
    State(state): State<Arc<AppState>>,
    Path(chart_id): Path<String>,
) -> Result<Json<ChartDto>, StatusCode> {
    let chart_id = parse_chart_id(chart_id)?;
    let chart = state
        .chart_repository
        .get_chart(&chart_id)
        .await
        .map_err(repository_status)?;
    Ok(Json(ChartDto::from(&chart)))
}

/// Full overwrite of a chart's state
pub async fn update_chart(
    State(state): State<Arc<AppState>>,
    Path(chart_id): Path<String>,
    Json(request): Json<UpdateChartRequest>,
) -> Result<Json<ChartDto>, StatusCode> {
    let chart_id = parse_chart_id(chart_id)?;
    let chart = state
        .chart_repository
        .update_chart_state(&chart_id, request.state)
        .await
        .map_err(repository_status)?;
    tracing::debug!("Chart '{}' state replaced", chart.id);
    Ok(Json(ChartDto::from(&chart)))
}

pub async fn delete_chart(
    State(state): State<Arc<AppState>>,
    Path(chart_id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let chart_id = parse_chart_id(chart_id)?;
    state
        .chart_repository
        .delete_chart(&chart_id)
        .await
        .map_err(repository_status)?;
    tracing::info!("Deleted chart '{}'", chart_id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_snapshots(
    State(state): State<Arc<AppState>>,
    Path(chart_id): Path<String>,
) -> Result<Json<Vec<SnapshotDto>>, StatusCode> {
    let chart_id = parse_chart_id(chart_id)?;
    let snapshots = state
        .chart_repository
        .list_snapshots(&chart_id)
        .await
        .map_err(repository_status)?;
    Ok(Json(snapshots.iter().map(SnapshotDto::from).collect()))
}

pub async fn create_snapshot(
    State(state): State<Arc<AppState>>,
    Path(chart_id): Path<String>,
    Json(request): Json<CreateSnapshotRequest>,
) -> Result<(StatusCode, Json<SnapshotDto>), StatusCode> {
    let chart_id = parse_chart_id(chart_id)?;
    let snapshot = state
        .chart_repository
        .create_snapshot(&chart_id, request.image)
        .await
        .map_err(repository_status)?;
    tracing::info!("Snapshot '{}' taken of chart '{}'", snapshot.id, chart_id);
    Ok((StatusCode::CREATED, Json(SnapshotDto::from(&snapshot))))
}

pub async fn delete_snapshot(
    State(state): State<Arc<AppState>>,
    Path(snapshot_id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let snapshot_id = parse_snapshot_id(snapshot_id)?;
    state
        .chart_repository
        .delete_snapshot(&snapshot_id)
        .await
        .map_err(repository_status)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Copy a snapshot's state back onto its chart
pub async fn restore_snapshot(
    State(state): State<Arc<AppState>>,
    Path(snapshot_id): Path<String>,
) -> Result<Json<ChartDto>, StatusCode> {
    let snapshot_id = parse_snapshot_id(snapshot_id)?;
    let chart = state
        .chart_repository
        .restore_snapshot(&snapshot_id)
        .await
        .map_err(repository_status)?;
    tracing::info!("Chart '{}' restored from snapshot '{}'", chart.id, snapshot_id);
    Ok(Json(ChartDto::from(&chart)))
}
