//! v1 Recommendation read-path handlers.
//!
//! These endpoints always answer 200 with a (possibly empty) list; storage
//! trouble is absorbed by the retriever's fallback tiers, never surfaced.

use axum::extract::{Path, Query, State};

use crate::api::v1::dto::{
    LimitQuery, PersonalizedQuery, PersonalizedResponse, ProductListResponse,
};
use crate::api::v1::response::ApiResponse;
use crate::api::AppState;

const DEFAULT_LIST_LIMIT: u32 = 12;
const DEFAULT_SIMILAR_LIMIT: u32 = 8;

fn clamp_limit(limit: Option<u32>, default: u32) -> usize {
    limit.unwrap_or(default).clamp(1, 100) as usize
}

/// `GET /api/v1/recommendations/personalized`
#[utoipa::path(
    get,
    path = "/api/v1/recommendations/personalized",
    tag = "recommendations",
    params(PersonalizedQuery),
    responses(
        (status = 200, description = "Ranked product list", body = PersonalizedResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn personalized(
    State(state): State<AppState>,
    Query(query): Query<PersonalizedQuery>,
) -> ApiResponse<PersonalizedResponse> {
    let limit = clamp_limit(query.limit, DEFAULT_LIST_LIMIT);
    let ranked = state.retriever.personalized(query.user_id, limit).await;
    ApiResponse::success(ranked.into())
}

/// `GET /api/v1/recommendations/similar/{productId}`
#[utoipa::path(
    get,
    path = "/api/v1/recommendations/similar/{productId}",
    tag = "recommendations",
    params(
        ("productId" = i64, Path, description = "Source product id"),
        LimitQuery,
    ),
    responses(
        (status = 200, description = "Products similar to the given product", body = ProductListResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn similar(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> ApiResponse<ProductListResponse> {
    let limit = clamp_limit(query.limit, DEFAULT_SIMILAR_LIMIT);
    let products = state.retriever.similar(product_id, limit).await;
    ApiResponse::success(products.into())
}

/// `GET /api/v1/recommendations/trending`
#[utoipa::path(
    get,
    path = "/api/v1/recommendations/trending",
    tag = "recommendations",
    params(LimitQuery),
    responses(
        (status = 200, description = "Recently popular products", body = ProductListResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn trending(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResponse<ProductListResponse> {
    let limit = clamp_limit(query.limit, DEFAULT_LIST_LIMIT);
    let products = state.trending.trending(limit).await;
    ApiResponse::success(products.into())
}
