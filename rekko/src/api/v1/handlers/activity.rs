//! v1 Activity tracking handler.

use axum::extract::State;
use axum::Json;

use crate::api::v1::dto::{TrackActivityRequest, TrackActivityResponse};
use crate::api::v1::response::{ApiResponse, ErrorCode};
use crate::api::AppState;

/// `POST /api/v1/activity`
///
/// The write happens on a spawned task: the caller never waits on
/// persistence and never observes a storage failure.
#[utoipa::path(
    post,
    path = "/api/v1/activity",
    tag = "activity",
    request_body = TrackActivityRequest,
    responses(
        (status = 200, description = "Activity accepted", body = TrackActivityResponse),
        (status = 400, description = "Missing or empty required fields"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn track_activity(
    State(state): State<AppState>,
    Json(req): Json<TrackActivityRequest>,
) -> ApiResponse<TrackActivityResponse> {
    if req.action.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "action must not be empty");
    }
    if req.session_id.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "sessionId must not be empty");
    }

    let recorder = state.recorder.clone();
    tokio::spawn(async move {
        recorder
            .record(req.user_id, req.product_id, &req.action, &req.session_id)
            .await;
    });

    ApiResponse::success(TrackActivityResponse { tracked: true })
}
