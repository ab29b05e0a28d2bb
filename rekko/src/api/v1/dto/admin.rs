//! Admin DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::jobs::{JobState, JobStatus};

/// Request body for `POST /v1/admin/scores:rebuild`. Omitting `userId` (or
/// the body entirely) rebuilds every known user.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RebuildScoresRequest {
    pub user_id: Option<i64>,
}

/// Snapshot of a named background job's latest run.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub name: String,
    pub state: JobState,
    #[schema(value_type = String)]
    pub started_at: DateTime<Utc>,
    #[schema(value_type = Option<String>)]
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl From<JobStatus> for JobStatusResponse {
    fn from(status: JobStatus) -> Self {
        Self {
            name: status.name,
            state: status.state,
            started_at: status.started_at,
            finished_at: status.finished_at,
            error: status.error,
        }
    }
}

/// Response for the single-collection clearing endpoints.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearedResponse {
    pub deleted: u64,
}

/// Response for `DELETE /v1/admin/recommendation-data`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearAllResponse {
    pub activities_deleted: u64,
    pub similarities_deleted: u64,
    pub scores_deleted: u64,
}

/// Response for `GET /v1/admin/stats`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_activities: u64,
    pub total_similarities: u64,
    pub total_user_scores: u64,
    /// PURCHASE events inside the trending window.
    pub recent_purchases: u64,
}
