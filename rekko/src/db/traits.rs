use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{ActivityEvent, Product, SimilarityEdge, UserProductScore};

// ---------------------------------------------------------------------------
// Individual store traits
// ---------------------------------------------------------------------------

/// Append and query operations for the interaction log. The log is
/// append-only and safe for unordered concurrent writers; batch jobs always
/// read by timestamp and tolerate slight write delay.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn append_activity(&self, event: &ActivityEvent) -> Result<()>;
    /// All of a user's events at or after `since`, oldest first.
    async fn get_user_activities_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityEvent>>;
    /// Distinct identified users with a PURCHASE event for the product.
    async fn get_purchasers(&self, product_id: i64) -> Result<Vec<i64>>;
    /// A user's PURCHASE events at or after `since`.
    async fn get_user_purchases_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityEvent>>;
    /// All PURCHASE events at or after `since`, identified or anonymous.
    async fn get_purchases_since(&self, since: DateTime<Utc>) -> Result<Vec<ActivityEvent>>;
    async fn count_activities(&self) -> Result<u64>;
    async fn count_purchases_since(&self, since: DateTime<Utc>) -> Result<u64>;
    async fn delete_all_activities(&self) -> Result<u64>;
}

/// Write and query operations for the similarity graph. The graph is fully
/// owned by the similarity engine; readers must treat a missing edge as a
/// normal condition, not an error.
#[async_trait]
pub trait SimilarityStore: Send + Sync {
    async fn insert_similarity(&self, edge: &SimilarityEdge) -> Result<()>;
    /// Highest-scoring outgoing edges for a product.
    async fn top_similarities(&self, product_id: i64, limit: u32) -> Result<Vec<SimilarityEdge>>;
    async fn count_similarities(&self) -> Result<u64>;
    async fn delete_all_similarities(&self) -> Result<u64>;
}

/// Write and query operations for precomputed per-user scores.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn insert_score(&self, score: &UserProductScore) -> Result<()>;
    /// A user's rows ordered by score descending.
    async fn top_scores_for_user(&self, user_id: i64, limit: u32)
        -> Result<Vec<UserProductScore>>;
    async fn delete_scores_for_user(&self, user_id: i64) -> Result<u64>;
    async fn count_scores(&self) -> Result<u64>;
    async fn delete_all_scores(&self) -> Result<u64>;
}

/// Read-only catalog lookups. The catalog is an external collaborator; the
/// engine never writes to it.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_product(&self, id: i64) -> Result<Option<Product>>;
    async fn get_active_products(&self) -> Result<Vec<Product>>;
    async fn get_products_by_category(&self, category: &str) -> Result<Vec<Product>>;
    async fn get_products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>>;
}

/// Read-only user directory, consumed by the bulk score rebuild.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_all_user_ids(&self) -> Result<Vec<i64>>;
}

// ---------------------------------------------------------------------------
// Unified backend supertrait
// ---------------------------------------------------------------------------

/// A complete database backend combining all store traits plus lifecycle
/// operations.
#[async_trait]
pub trait DatabaseBackend:
    ActivityStore + SimilarityStore + ScoreStore + CatalogStore + UserDirectory
{
    /// Sync with remote (e.g. Turso replication). No-op for local-only backends.
    async fn sync(&self) -> Result<()>;
}
