use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;
use super::middleware::v1_auth_middleware;

pub fn v1_router(state: AppState) -> Router<AppState> {
    let recommendations = Router::new()
        .route(
            "/personalized",
            get(handlers::recommendations::personalized),
        )
        .route(
            "/similar/{productId}",
            get(handlers::recommendations::similar),
        )
        .route("/trending", get(handlers::recommendations::trending));

    let admin = Router::new()
        .route(
            "/similarities:rebuild",
            post(handlers::admin::rebuild_similarities),
        )
        .route("/scores:rebuild", post(handlers::admin::rebuild_scores))
        .route("/jobs/{jobName}", get(handlers::admin::job_status))
        .route("/jobs/{jobName}/cancel", post(handlers::admin::cancel_job))
        .route(
            "/similarities",
            delete(handlers::admin::clear_similarities),
        )
        .route("/scores", delete(handlers::admin::clear_scores))
        .route(
            "/recommendation-data",
            delete(handlers::admin::clear_all_recommendation_data),
        )
        .route("/stats", get(handlers::admin::stats));

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router());

    let protected_routes = Router::new()
        .route("/activity", post(handlers::activity::track_activity))
        .nest("/recommendations", recommendations)
        .nest("/admin", admin)
        .route_layer(middleware::from_fn_with_state(state, v1_auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
