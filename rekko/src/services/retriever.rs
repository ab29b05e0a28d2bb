use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::error;

use crate::config::RecommendationConfig;
use crate::db::DatabaseBackend;
use crate::error::Result;
use crate::models::Product;

use super::{in_ranked_order, TrendingEngine};

/// Which tier ultimately served a personalized request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    Personalized,
    Trending,
}

#[derive(Debug, Clone)]
pub struct RankedRecommendations {
    pub products: Vec<Product>,
    pub source: RecommendationSource,
}

/// Read path for ranked product lists.
///
/// Resolution is tiered, first non-empty tier wins: precomputed per-user
/// scores, then a live computation over the user's recent activity and the
/// similarity graph, then trending. A row's absence and a half-rebuilt graph
/// are expected conditions here, and storage failures degrade to the next
/// tier; this path never fails visibly to a caller.
#[derive(Clone)]
pub struct RecommendationRetriever {
    db: Arc<dyn DatabaseBackend>,
    trending: TrendingEngine,
    config: RecommendationConfig,
}

impl RecommendationRetriever {
    pub fn new(
        db: Arc<dyn DatabaseBackend>,
        trending: TrendingEngine,
        config: RecommendationConfig,
    ) -> Self {
        Self {
            db,
            trending,
            config,
        }
    }

    pub async fn personalized(&self, user_id: Option<i64>, limit: usize) -> RankedRecommendations {
        let Some(user_id) = user_id else {
            return self.trending_tier(limit).await;
        };

        match self.precomputed_tier(user_id, limit).await {
            Ok(products) if !products.is_empty() => {
                return RankedRecommendations {
                    products,
                    source: RecommendationSource::Personalized,
                };
            }
            Ok(_) => {}
            Err(e) => {
                error!(user_id, error = %e, "Precomputed tier failed, serving trending");
                return self.trending_tier(limit).await;
            }
        }

        match self.live_tier(user_id, limit).await {
            Ok(products) if !products.is_empty() => RankedRecommendations {
                products,
                source: RecommendationSource::Personalized,
            },
            Ok(_) => self.trending_tier(limit).await,
            Err(e) => {
                error!(user_id, error = %e, "Live tier failed, serving trending");
                self.trending_tier(limit).await
            }
        }
    }

    /// Top precomputed edges for a product; with an empty graph, fall back to
    /// same-category active products (excluding the product itself). Failures
    /// degrade to an empty list.
    pub async fn similar(&self, product_id: i64, limit: usize) -> Vec<Product> {
        match self.similar_inner(product_id, limit).await {
            Ok(products) => products,
            Err(e) => {
                error!(product_id, error = %e, "Similar products lookup failed");
                Vec::new()
            }
        }
    }

    async fn trending_tier(&self, limit: usize) -> RankedRecommendations {
        RankedRecommendations {
            products: self.trending.trending(limit).await,
            source: RecommendationSource::Trending,
        }
    }

    async fn precomputed_tier(&self, user_id: i64, limit: usize) -> Result<Vec<Product>> {
        let scores = self
            .db
            .top_scores_for_user(user_id, self.config.score_read_limit)
            .await?;
        let ids: Vec<i64> = scores.iter().take(limit).map(|s| s.product_id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let products = self.db.get_products_by_ids(&ids).await?;
        Ok(in_ranked_order(&ids, products)
            .into_iter()
            .filter(|p| p.is_active)
            .collect())
    }

    /// Walk the user's recent events through the similarity graph, skipping
    /// anything they already interacted with in the window.
    async fn live_tier(&self, user_id: i64, limit: usize) -> Result<Vec<Product>> {
        let since = Utc::now() - Duration::days(self.config.live_window_days);
        let activities = self.db.get_user_activities_since(user_id, since).await?;
        if activities.is_empty() {
            return Ok(Vec::new());
        }

        let interacted: HashSet<i64> = activities.iter().map(|a| a.product_id).collect();
        let mut accumulated: HashMap<i64, f64> = HashMap::new();
        for activity in &activities {
            let edges = self
                .db
                .top_similarities(activity.product_id, self.config.live_edge_limit)
                .await?;
            for edge in edges {
                if interacted.contains(&edge.similar_product_id) {
                    continue;
                }
                *accumulated.entry(edge.similar_product_id).or_insert(0.0) +=
                    edge.similarity_score * activity.weight;
            }
        }

        let mut ranked: Vec<(i64, f64)> = accumulated.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        let candidate_ids: Vec<i64> = ranked
            .into_iter()
            .take(limit * 2)
            .map(|(product_id, _)| product_id)
            .collect();

        let products = self.db.get_products_by_ids(&candidate_ids).await?;
        Ok(in_ranked_order(&candidate_ids, products)
            .into_iter()
            .filter(|p| p.is_active)
            .take(limit)
            .collect())
    }

    async fn similar_inner(&self, product_id: i64, limit: usize) -> Result<Vec<Product>> {
        let edges = self
            .db
            .top_similarities(product_id, self.config.edge_read_limit)
            .await?;

        if edges.is_empty() {
            let Some(product) = self.db.get_product(product_id).await? else {
                return Ok(Vec::new());
            };
            let neighbors = self.db.get_products_by_category(&product.category).await?;
            return Ok(neighbors
                .into_iter()
                .filter(|p| p.id != product_id && p.is_active)
                .take(limit)
                .collect());
        }

        let ids: Vec<i64> = edges.iter().map(|e| e.similar_product_id).collect();
        let products = self.db.get_products_by_ids(&ids).await?;
        Ok(in_ranked_order(&ids, products)
            .into_iter()
            .filter(|p| p.is_active)
            .take(limit)
            .collect())
    }
}
