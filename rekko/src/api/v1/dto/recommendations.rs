//! Recommendation read-path DTOs for the v1 API.

use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::services::{RankedRecommendations, RecommendationSource};

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub price: f64,
    pub is_active: bool,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            title: p.title,
            category: p.category,
            price: p.price,
            is_active: p.is_active,
        }
    }
}

/// Which tier served a personalized list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    Personalized,
    Trending,
}

impl From<RecommendationSource> for RecommendationType {
    fn from(source: RecommendationSource) -> Self {
        match source {
            RecommendationSource::Personalized => RecommendationType::Personalized,
            RecommendationSource::Trending => RecommendationType::Trending,
        }
    }
}

/// Query parameters for `GET /v1/recommendations/personalized`.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PersonalizedQuery {
    /// Omit for anonymous callers; they are served the trending list.
    pub user_id: Option<i64>,
    /// Defaults to 12, clamped to `1..=100`.
    pub limit: Option<u32>,
}

/// Query parameters carrying only a result limit.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

/// Response for `GET /v1/recommendations/personalized`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedResponse {
    pub items: Vec<ProductDto>,
    pub count: u32,
    #[serde(rename = "type")]
    pub recommendation_type: RecommendationType,
}

impl From<RankedRecommendations> for PersonalizedResponse {
    fn from(ranked: RankedRecommendations) -> Self {
        let items: Vec<ProductDto> = ranked.products.into_iter().map(ProductDto::from).collect();
        Self {
            count: items.len() as u32,
            items,
            recommendation_type: ranked.source.into(),
        }
    }
}

/// Response for similar-products and trending lists.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub items: Vec<ProductDto>,
    pub count: u32,
}

impl From<Vec<Product>> for ProductListResponse {
    fn from(products: Vec<Product>) -> Self {
        let items: Vec<ProductDto> = products.into_iter().map(ProductDto::from).collect();
        Self {
            count: items.len() as u32,
            items,
        }
    }
}
