//! v1 Admin handlers: on-demand rebuilds, job control, data purges, stats.
//!
//! Triggered rebuilds run through the [`JobRegistry`](crate::jobs::JobRegistry)
//! so every run is queryable and cancellable. Nothing serializes a triggered
//! run against the periodic scheduler; overlapping rebuilds may race.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{Duration, Utc};

use crate::api::v1::dto::{
    ClearAllResponse, ClearedResponse, JobStatusResponse, RebuildScoresRequest, StatsResponse,
};
use crate::api::v1::response::{ApiResponse, ErrorCode};
use crate::api::AppState;

pub const SIMILARITY_REBUILD_JOB: &str = "similarity-rebuild";
pub const SCORE_REBUILD_JOB: &str = "score-rebuild";

/// `POST /api/v1/admin/similarities:rebuild`
#[utoipa::path(
    post,
    path = "/api/v1/admin/similarities:rebuild",
    tag = "admin",
    responses(
        (status = 202, description = "Similarity rebuild started", body = JobStatusResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn rebuild_similarities(State(state): State<AppState>) -> ApiResponse<JobStatusResponse> {
    let engine = state.similarity.clone();
    let status = state
        .jobs
        .spawn(SIMILARITY_REBUILD_JOB, move |token| async move {
            engine.rebuild(&token).await.map(|_| ())
        })
        .await;

    ApiResponse::accepted(status.into())
}

/// `POST /api/v1/admin/scores:rebuild`
#[utoipa::path(
    post,
    path = "/api/v1/admin/scores:rebuild",
    tag = "admin",
    request_body(content = RebuildScoresRequest, description = "Omit userId to rebuild all users"),
    responses(
        (status = 202, description = "Score rebuild started", body = JobStatusResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn rebuild_scores(
    State(state): State<AppState>,
    body: Option<Json<RebuildScoresRequest>>,
) -> ApiResponse<JobStatusResponse> {
    let user_id = body.and_then(|Json(req)| req.user_id);
    let engine = state.scores.clone();

    let status = match user_id {
        Some(user_id) => {
            state
                .jobs
                .spawn(SCORE_REBUILD_JOB, move |_token| async move {
                    engine.rebuild_for_user(user_id).await.map(|_| ())
                })
                .await
        }
        None => {
            state
                .jobs
                .spawn(SCORE_REBUILD_JOB, move |token| async move {
                    engine.rebuild_all(&token).await.map(|_| ())
                })
                .await
        }
    };

    ApiResponse::accepted(status.into())
}

/// `GET /api/v1/admin/jobs/{jobName}`
#[utoipa::path(
    get,
    path = "/api/v1/admin/jobs/{jobName}",
    tag = "admin",
    params(("jobName" = String, Path, description = "Background job name")),
    responses(
        (status = 200, description = "Latest run of the job", body = JobStatusResponse),
        (status = 404, description = "Job was never started"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_name): Path<String>,
) -> ApiResponse<JobStatusResponse> {
    match state.jobs.status(&job_name).await {
        Some(status) => ApiResponse::success(status.into()),
        None => ApiResponse::error(ErrorCode::NotFound, format!("Unknown job '{job_name}'")),
    }
}

/// `POST /api/v1/admin/jobs/{jobName}/cancel`
#[utoipa::path(
    post,
    path = "/api/v1/admin/jobs/{jobName}/cancel",
    tag = "admin",
    params(("jobName" = String, Path, description = "Background job name")),
    responses(
        (status = 200, description = "Cancellation requested", body = JobStatusResponse),
        (status = 404, description = "Job was never started"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(job_name): Path<String>,
) -> ApiResponse<JobStatusResponse> {
    match state.jobs.cancel(&job_name).await {
        Some(status) => ApiResponse::success(status.into()),
        None => ApiResponse::error(ErrorCode::NotFound, format!("Unknown job '{job_name}'")),
    }
}

/// `DELETE /api/v1/admin/similarities`
#[utoipa::path(
    delete,
    path = "/api/v1/admin/similarities",
    tag = "admin",
    responses(
        (status = 200, description = "Similarity graph cleared", body = ClearedResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn clear_similarities(State(state): State<AppState>) -> ApiResponse<ClearedResponse> {
    match state.db.delete_all_similarities().await {
        Ok(deleted) => ApiResponse::success(ClearedResponse { deleted }),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/v1/admin/scores`
#[utoipa::path(
    delete,
    path = "/api/v1/admin/scores",
    tag = "admin",
    responses(
        (status = 200, description = "User scores cleared", body = ClearedResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn clear_scores(State(state): State<AppState>) -> ApiResponse<ClearedResponse> {
    match state.db.delete_all_scores().await {
        Ok(deleted) => ApiResponse::success(ClearedResponse { deleted }),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/v1/admin/recommendation-data`
///
/// The full purge: activity log, similarity graph and precomputed scores.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/recommendation-data",
    tag = "admin",
    responses(
        (status = 200, description = "All recommendation data cleared", body = ClearAllResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn clear_all_recommendation_data(
    State(state): State<AppState>,
) -> ApiResponse<ClearAllResponse> {
    let activities_deleted = match state.db.delete_all_activities().await {
        Ok(deleted) => deleted,
        Err(e) => return e.into(),
    };
    let similarities_deleted = match state.db.delete_all_similarities().await {
        Ok(deleted) => deleted,
        Err(e) => return e.into(),
    };
    let scores_deleted = match state.db.delete_all_scores().await {
        Ok(deleted) => deleted,
        Err(e) => return e.into(),
    };

    ApiResponse::success(ClearAllResponse {
        activities_deleted,
        similarities_deleted,
        scores_deleted,
    })
}

/// `GET /api/v1/admin/stats`
#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    tag = "admin",
    responses(
        (status = 200, description = "Recommendation data counts", body = StatsResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn stats(State(state): State<AppState>) -> ApiResponse<StatsResponse> {
    let total_activities = match state.db.count_activities().await {
        Ok(count) => count,
        Err(e) => return e.into(),
    };
    let total_similarities = match state.db.count_similarities().await {
        Ok(count) => count,
        Err(e) => return e.into(),
    };
    let total_user_scores = match state.db.count_scores().await {
        Ok(count) => count,
        Err(e) => return e.into(),
    };

    let window = Duration::days(state.config.recommendation.trending_window_days);
    let recent_purchases = match state.db.count_purchases_since(Utc::now() - window).await {
        Ok(count) => count,
        Err(e) => return e.into(),
    };

    ApiResponse::success(StatsResponse {
        total_activities,
        total_similarities,
        total_user_scores,
        recent_purchases,
    })
}
