use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::error;

use crate::config::RecommendationConfig;
use crate::db::DatabaseBackend;
use crate::error::Result;
use crate::models::Product;

use super::in_ranked_order;

/// Popularity ranking from recent purchase counts, independent of any user.
/// Serves standalone requests and acts as the read path's final fallback
/// tier, so it must itself never fail visibly: any internal failure degrades
/// to a raw active-catalog listing.
#[derive(Clone)]
pub struct TrendingEngine {
    db: Arc<dyn DatabaseBackend>,
    config: RecommendationConfig,
}

impl TrendingEngine {
    pub fn new(db: Arc<dyn DatabaseBackend>, config: RecommendationConfig) -> Self {
        Self { db, config }
    }

    pub async fn trending(&self, limit: usize) -> Vec<Product> {
        match self.ranked_by_purchases(limit).await {
            Ok(Some(products)) => products,
            Ok(None) => self.any_active(limit).await,
            Err(e) => {
                error!(error = %e, "Trending ranking failed, serving active catalog fallback");
                self.any_active(limit).await
            }
        }
    }

    /// `None` means the purchase window was empty and the caller should fall
    /// back to the unranked catalog.
    async fn ranked_by_purchases(&self, limit: usize) -> Result<Option<Vec<Product>>> {
        let since = Utc::now() - Duration::days(self.config.trending_window_days);
        let purchases = self.db.get_purchases_since(since).await?;
        if purchases.is_empty() {
            return Ok(None);
        }

        let mut counts: HashMap<i64, u64> = HashMap::new();
        for event in &purchases {
            *counts.entry(event.product_id).or_insert(0) += 1;
        }

        let mut ranked: Vec<(i64, u64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        let candidate_ids: Vec<i64> = ranked
            .into_iter()
            .take(limit * 2)
            .map(|(product_id, _)| product_id)
            .collect();

        let products = self.db.get_products_by_ids(&candidate_ids).await?;
        Ok(Some(
            in_ranked_order(&candidate_ids, products)
                .into_iter()
                .filter(|p| p.is_active)
                .take(limit)
                .collect(),
        ))
    }

    async fn any_active(&self, limit: usize) -> Vec<Product> {
        match self.db.get_active_products().await {
            Ok(products) => products.into_iter().take(limit).collect(),
            Err(e) => {
                error!(error = %e, "Active catalog fallback failed");
                Vec::new()
            }
        }
    }
}
