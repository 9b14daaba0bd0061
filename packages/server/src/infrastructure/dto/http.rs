//! HTTP API request / response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::{Chart, ChartSnapshot, Room};
use flowsync_shared::time::timestamp_to_jst_rfc3339;

/// Room summary for list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub occupancy: usize,
    pub created_at: String, // ISO 8601
}

/// Room detail for detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub members: Vec<String>,
    pub occupancy: usize,
    pub created_at: String, // ISO 8601
}

impl From<&Room> for RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            occupancy: room.occupancy(),
            created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
        }
    }
}

impl From<&Room> for RoomDetailDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            members: room.members.iter().map(|m| m.as_str().to_string()).collect(),
            occupancy: room.occupancy(),
            created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
        }
    }
}

/// Body of `POST /api/charts`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChartRequest {
    #[serde(default)]
    pub title: String,
}

/// Body of `PUT /api/charts/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateChartRequest {
    pub state: serde_json::Value,
}

/// Body of `POST /api/charts/{id}/snapshots`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSnapshotRequest {
    #[serde(default)]
    pub image: Option<String>,
}

/// Full chart record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDto {
    pub id: String,
    pub title: String,
    pub state: serde_json::Value,
    pub created_at: String, // ISO 8601
    pub updated_at: String, // ISO 8601
}

impl From<&Chart> for ChartDto {
    fn from(chart: &Chart) -> Self {
        Self {
            id: chart.id.as_str().to_string(),
            title: chart.title.as_str().to_string(),
            state: chart.state.clone(),
            created_at: timestamp_to_jst_rfc3339(chart.created_at.value()),
            updated_at: timestamp_to_jst_rfc3339(chart.updated_at.value()),
        }
    }
}

/// Chart entry for list endpoint (no state)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSummaryDto {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Chart> for ChartSummaryDto {
    fn from(chart: &Chart) -> Self {
        Self {
            id: chart.id.as_str().to_string(),
            title: chart.title.as_str().to_string(),
            created_at: timestamp_to_jst_rfc3339(chart.created_at.value()),
            updated_at: timestamp_to_jst_rfc3339(chart.updated_at.value()),
        }
    }
}

/// Persisted snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDto {
    pub id: String,
    pub chart_id: String,
    pub state: serde_json::Value,
    pub image_url: Option<String>,
    pub created_at: String, // ISO 8601
}

impl From<&ChartSnapshot> for SnapshotDto {
    fn from(snapshot: &ChartSnapshot) -> Self {
        Self {
            id: snapshot.id.as_str().to_string(),
            chart_id: snapshot.chart_id.as_str().to_string(),
            state: snapshot.state.clone(),
            image_url: snapshot.image_url.clone(),
            created_at: timestamp_to_jst_rfc3339(snapshot.created_at.value()),
        }
    }
}
