//! Activity tracking DTOs for the v1 API.

use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/activity`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackActivityRequest {
    /// Absent for anonymous sessions.
    pub user_id: Option<i64>,
    pub product_id: i64,
    /// Canonical actions are VIEW, CLICK, ADD_TO_CART and PURCHASE; other
    /// values are recorded at the default weight.
    pub action: String,
    /// Correlates anonymous activity.
    pub session_id: String,
}

/// Response for `POST /v1/activity`.
///
/// Recording is fire-and-forget: `tracked` acknowledges acceptance, not
/// persistence.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackActivityResponse {
    pub tracked: bool,
}
