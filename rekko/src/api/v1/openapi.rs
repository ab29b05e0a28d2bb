use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rekko API",
        version = "1.0.0",
        description = "Self-hostable recommendation engine for e-commerce storefronts.",
    ),
    paths(
        handlers::health::health_check,
        handlers::activity::track_activity,
        handlers::recommendations::personalized,
        handlers::recommendations::similar,
        handlers::recommendations::trending,
        handlers::admin::rebuild_similarities,
        handlers::admin::rebuild_scores,
        handlers::admin::job_status,
        handlers::admin::cancel_job,
        handlers::admin::clear_similarities,
        handlers::admin::clear_scores,
        handlers::admin::clear_all_recommendation_data,
        handlers::admin::stats,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        // Activity
        dto::activity::TrackActivityRequest,
        dto::activity::TrackActivityResponse,
        // Recommendations
        dto::recommendations::ProductDto,
        dto::recommendations::RecommendationType,
        dto::recommendations::PersonalizedResponse,
        dto::recommendations::ProductListResponse,
        // Admin
        dto::admin::RebuildScoresRequest,
        dto::admin::JobStatusResponse,
        dto::admin::ClearedResponse,
        dto::admin::ClearAllResponse,
        dto::admin::StatsResponse,
        crate::jobs::JobState,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::DatabaseStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "activity", description = "Interaction event tracking"),
        (name = "recommendations", description = "Personalized, similar and trending product lists"),
        (name = "admin", description = "Rebuild triggers, job control, data purges and stats (auth required)"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

/// `GET /api/v1/openapi.json`
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Redoc UI mounted at `/docs` (relative to the v1 prefix).
pub fn redoc_router<S>() -> axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    axum::Router::new().merge(Redoc::with_url("/docs", ApiDoc::openapi()))
}
