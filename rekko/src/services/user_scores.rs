use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::RecommendationConfig;
use crate::db::DatabaseBackend;
use crate::error::Result;
use crate::models::UserProductScore;

/// Per-user batch job producing the precomputed affinity rows the fast
/// personalized tier serves from.
///
/// A product directly interacted with accumulates the full event weight; a
/// product merely similar to one interacted with accumulates the weight scaled
/// by the edge score and the propagation decay.
#[derive(Clone)]
pub struct UserScoreEngine {
    db: Arc<dyn DatabaseBackend>,
    config: RecommendationConfig,
}

impl UserScoreEngine {
    pub fn new(db: Arc<dyn DatabaseBackend>, config: RecommendationConfig) -> Self {
        Self { db, config }
    }

    /// Replace one user's score rows. A user with no recent activity ends up
    /// with no rows, which is a normal outcome, not an error. Returns the
    /// number of rows written.
    pub async fn rebuild_for_user(&self, user_id: i64) -> Result<u64> {
        self.db.delete_scores_for_user(user_id).await?;

        let since = Utc::now() - Duration::days(self.config.score_window_days);
        let activities = self.db.get_user_activities_since(user_id, since).await?;
        if activities.is_empty() {
            debug!(user_id, "No recent activity, no scores written");
            return Ok(0);
        }

        let mut accumulated: HashMap<i64, f64> = HashMap::new();
        for activity in &activities {
            *accumulated.entry(activity.product_id).or_insert(0.0) += activity.weight;

            let edges = self
                .db
                .top_similarities(activity.product_id, self.config.propagation_edge_limit)
                .await?;
            for edge in edges {
                let propagated =
                    activity.weight * edge.similarity_score * self.config.propagation_decay;
                *accumulated.entry(edge.similar_product_id).or_insert(0.0) += propagated;
            }
        }

        // One shared timestamp for the whole batch.
        let now = Utc::now();
        for (product_id, score) in &accumulated {
            self.db
                .insert_score(&UserProductScore::new(user_id, *product_id, *score, now))
                .await?;
        }

        debug!(user_id, products = accumulated.len(), "User scores rebuilt");
        Ok(accumulated.len() as u64)
    }

    /// Rebuild every known user sequentially. Per-user failures are isolated
    /// and logged; a pause after each block of users bounds load on the
    /// shared store. Returns the number of users successfully processed.
    pub async fn rebuild_all(&self, cancel: &CancellationToken) -> Result<u64> {
        info!("Starting bulk user score rebuild");

        let user_ids = self.db.get_all_user_ids().await?;
        let mut processed = 0u64;

        for user_id in user_ids {
            if cancel.is_cancelled() {
                info!(processed, "Bulk user score rebuild cancelled");
                break;
            }

            if let Err(e) = self.rebuild_for_user(user_id).await {
                error!(user_id, error = %e, "Skipping user in score rebuild");
                continue;
            }

            processed += 1;
            if processed % self.config.rebuild_batch_size as u64 == 0 {
                info!(processed, "User score rebuild progress");
                tokio::time::sleep(std::time::Duration::from_millis(
                    self.config.rebuild_batch_pause_ms,
                ))
                .await;
            }
        }

        info!(processed, "Bulk user score rebuild complete");
        Ok(processed)
    }
}
