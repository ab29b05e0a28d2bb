use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::RecommendationConfig;
use crate::db::DatabaseBackend;
use crate::error::Result;
use crate::models::{Product, SimilarityBasis, SimilarityEdge};

/// Full-rebuild batch job deriving the product-to-product similarity graph
/// from the catalog and the purchase history.
///
/// Two independent signals feed the graph: shared category (fixed score) and
/// co-purchase affinity (scaled by how many distinct purchasers agree). The
/// edge set is deleted up front and repopulated incrementally, so concurrent
/// readers can observe a partially rebuilt graph; the read path's fallback
/// tiers absorb that window.
#[derive(Clone)]
pub struct SimilarityEngine {
    db: Arc<dyn DatabaseBackend>,
    config: RecommendationConfig,
}

#[derive(Debug, Default)]
pub struct SimilarityRebuildSummary {
    pub products_processed: u64,
    pub edges_written: u64,
    pub cancelled: bool,
}

impl SimilarityEngine {
    pub fn new(db: Arc<dyn DatabaseBackend>, config: RecommendationConfig) -> Self {
        Self { db, config }
    }

    /// Run one full rebuild. Per-product failures are logged and skipped;
    /// an error from the initial delete or the catalog scan aborts the run,
    /// leaving whatever subset of edges was already written.
    pub async fn rebuild(&self, cancel: &CancellationToken) -> Result<SimilarityRebuildSummary> {
        info!("Starting similarity graph rebuild");

        self.db.delete_all_similarities().await?;
        let products = self.db.get_active_products().await?;

        let mut summary = SimilarityRebuildSummary::default();
        for product in &products {
            if cancel.is_cancelled() {
                info!(
                    products_processed = summary.products_processed,
                    "Similarity rebuild cancelled"
                );
                summary.cancelled = true;
                break;
            }

            match self.edges_for_product(product).await {
                Ok(written) => summary.edges_written += written,
                Err(e) => {
                    error!(product_id = product.id, error = %e, "Skipping product in similarity rebuild");
                }
            }

            summary.products_processed += 1;
            if summary.products_processed % 50 == 0 {
                info!(
                    products_processed = summary.products_processed,
                    "Similarity rebuild progress"
                );
            }
        }

        info!(
            products_processed = summary.products_processed,
            edges_written = summary.edges_written,
            "Similarity graph rebuild complete"
        );
        Ok(summary)
    }

    async fn edges_for_product(&self, product: &Product) -> Result<u64> {
        let mut written = self.category_edges(product).await?;
        written += self.co_purchase_edges(product).await?;
        Ok(written)
    }

    /// Same-category neighbors get a fixed-score edge. Always available, even
    /// with no purchase history at all.
    async fn category_edges(&self, product: &Product) -> Result<u64> {
        let neighbors = self.db.get_products_by_category(&product.category).await?;

        let mut written = 0u64;
        for neighbor in neighbors
            .iter()
            .filter(|p| p.id != product.id && p.is_active)
            .take(self.config.category_edge_limit as usize)
        {
            let edge = SimilarityEdge::new(
                product.id,
                neighbor.id,
                self.config.category_edge_score,
                SimilarityBasis::Category,
            );
            self.db.insert_similarity(&edge).await?;
            written += 1;
        }
        Ok(written)
    }

    /// "Bought together" affinity: for each distinct purchaser of the product,
    /// collect their other recent purchases, then count per candidate how many
    /// distinct purchasers agree. Agreement among a majority of purchasers
    /// approaches the maximum score.
    async fn co_purchase_edges(&self, product: &Product) -> Result<u64> {
        let buyers = self.db.get_purchasers(product.id).await?;
        if buyers.is_empty() {
            return Ok(0);
        }

        let since = Utc::now() - Duration::days(self.config.copurchase_window_days);
        let mut co_buyer_counts: HashMap<i64, u64> = HashMap::new();
        for &buyer in &buyers {
            let purchases = self.db.get_user_purchases_since(buyer, since).await?;
            let candidates: HashSet<i64> = purchases
                .iter()
                .map(|event| event.product_id)
                .filter(|&pid| pid != product.id)
                .collect();
            for candidate in candidates {
                *co_buyer_counts.entry(candidate).or_insert(0) += 1;
            }
        }

        let total_buyers = buyers.len() as f64;
        let mut written = 0u64;
        for (candidate, count) in co_buyer_counts {
            if count < self.config.copurchase_min_buyers {
                continue;
            }
            let score = (count as f64 / total_buyers * 2.0).min(1.0);
            let edge = SimilarityEdge::new(
                product.id,
                candidate,
                score,
                SimilarityBasis::CoPurchase,
            );
            self.db.insert_similarity(&edge).await?;
            written += 1;
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::{Database, LibSqlBackend};
    use crate::models::ActivityAction;
    use chrono::DateTime;
    use libsql::params;

    async fn setup_test_db() -> (libsql::Connection, Arc<dyn DatabaseBackend>) {
        use std::time::{SystemTime, UNIX_EPOCH};

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let thread_id = std::thread::current().id();

        let config = DatabaseConfig {
            url: format!(
                "file:/tmp/rekko_test_db_{thread_id:?}_{timestamp}?mode=memory&cache=shared"
            ),
            auth_token: None,
            local_path: None,
        };
        let database = Database::new(&config).await.unwrap();
        let conn = database.connect().unwrap();
        let backend: Arc<dyn DatabaseBackend> = Arc::new(LibSqlBackend::new(database));
        (conn, backend)
    }

    async fn insert_product(conn: &libsql::Connection, id: i64, category: &str, active: bool) {
        conn.execute(
            "INSERT INTO products (id, title, category, price, is_active) VALUES (?1, ?2, ?3, 10.0, ?4)",
            params![id, format!("Product {id}"), category, active as i64],
        )
        .await
        .unwrap();
    }

    async fn insert_activity(
        conn: &libsql::Connection,
        user_id: Option<i64>,
        product_id: i64,
        action: ActivityAction,
        timestamp: DateTime<Utc>,
    ) {
        conn.execute(
            r#"
            INSERT INTO user_activity (id, user_id, product_id, action, timestamp, session_id, weight)
            VALUES (?1, ?2, ?3, ?4, ?5, 'test-sess', 10.0)
            "#,
            params![
                nanoid::nanoid!(),
                user_id,
                product_id,
                action.as_str(),
                timestamp.to_rfc3339(),
            ],
        )
        .await
        .unwrap();
    }

    async fn all_edges(conn: &libsql::Connection) -> Vec<(i64, i64, f64, String)> {
        let mut rows = conn
            .query(
                "SELECT product_id, similar_product_id, similarity_score, basis \
                 FROM product_similarity ORDER BY product_id, similar_product_id, basis",
                (),
            )
            .await
            .unwrap();
        let mut edges = Vec::new();
        while let Some(row) = rows.next().await.unwrap() {
            edges.push((
                row.get(0).unwrap(),
                row.get(1).unwrap(),
                row.get(2).unwrap(),
                row.get(3).unwrap(),
            ));
        }
        edges
    }

    fn engine(db: Arc<dyn DatabaseBackend>) -> SimilarityEngine {
        SimilarityEngine::new(db, RecommendationConfig::default())
    }

    #[tokio::test]
    async fn test_category_edges_have_fixed_score() {
        let (conn, db) = setup_test_db().await;
        insert_product(&conn, 1, "Shoes", true).await;
        insert_product(&conn, 2, "Shoes", true).await;
        insert_product(&conn, 3, "Shoes", true).await;
        insert_product(&conn, 4, "Outerwear", true).await;

        let summary = engine(db).rebuild(&CancellationToken::new()).await.unwrap();
        assert_eq!(summary.products_processed, 4);
        assert!(!summary.cancelled);

        let edges = all_edges(&conn).await;
        // Each of the 3 shoes links to the 2 others; the jacket has no neighbors.
        assert_eq!(edges.len(), 6);
        for (source, target, score, basis) in &edges {
            assert_ne!(source, target);
            assert_eq!(*score, 0.7);
            assert_eq!(basis, "CATEGORY");
        }
    }

    #[tokio::test]
    async fn test_inactive_products_excluded_from_category_signal() {
        let (conn, db) = setup_test_db().await;
        insert_product(&conn, 1, "Shoes", true).await;
        insert_product(&conn, 2, "Shoes", false).await;
        insert_product(&conn, 3, "Shoes", true).await;

        engine(db).rebuild(&CancellationToken::new()).await.unwrap();

        let edges = all_edges(&conn).await;
        assert_eq!(edges.len(), 2);
        for (source, target, _, _) in &edges {
            assert_ne!(*source, 2, "inactive product must not be a source");
            assert_ne!(*target, 2, "inactive product must not be a target");
        }
    }

    #[tokio::test]
    async fn test_co_purchase_edges_require_agreement() {
        let (conn, db) = setup_test_db().await;
        insert_product(&conn, 1, "A", true).await;
        insert_product(&conn, 2, "B", true).await;
        insert_product(&conn, 3, "C", true).await;

        let now = Utc::now();
        // Users 1..=5 all bought product 1; only users 1 and 2 also bought
        // product 2; only user 3 also bought product 3.
        for user in 1..=5 {
            insert_activity(&conn, Some(user), 1, ActivityAction::Purchase, now).await;
        }
        insert_activity(&conn, Some(1), 2, ActivityAction::Purchase, now).await;
        insert_activity(&conn, Some(2), 2, ActivityAction::Purchase, now).await;
        insert_activity(&conn, Some(3), 3, ActivityAction::Purchase, now).await;

        engine(db).rebuild(&CancellationToken::new()).await.unwrap();

        let edges: Vec<_> = all_edges(&conn)
            .await
            .into_iter()
            .filter(|(_, _, _, basis)| basis == "CO_PURCHASE")
            .collect();

        // Product 3 has a single co-purchaser, below the agreement floor.
        assert!(!edges
            .iter()
            .any(|(source, target, _, _)| *source == 1 && *target == 3));
        let forward = edges
            .iter()
            .find(|(source, target, _, _)| *source == 1 && *target == 2)
            .expect("edge 1 -> 2");
        // 2 of 5 purchasers agree: 2/5 * 2 = 0.8
        assert!((forward.2 - 0.8).abs() < 1e-9);

        // The reverse direction: both purchasers of product 2 bought product 1,
        // 2/2 * 2 capped at 1.0.
        let reverse = edges
            .iter()
            .find(|(source, target, _, _)| *source == 2 && *target == 1)
            .expect("edge 2 -> 1");
        assert_eq!(reverse.2, 1.0);
    }

    #[tokio::test]
    async fn test_co_purchase_counts_distinct_users() {
        let (conn, db) = setup_test_db().await;
        insert_product(&conn, 1, "A", true).await;
        insert_product(&conn, 2, "B", true).await;

        let now = Utc::now();
        insert_activity(&conn, Some(1), 1, ActivityAction::Purchase, now).await;
        insert_activity(&conn, Some(2), 1, ActivityAction::Purchase, now).await;
        insert_activity(&conn, Some(3), 1, ActivityAction::Purchase, now).await;
        insert_activity(&conn, Some(4), 1, ActivityAction::Purchase, now).await;
        // User 1 bought product 2 three times; still a single agreeing user.
        for _ in 0..3 {
            insert_activity(&conn, Some(1), 2, ActivityAction::Purchase, now).await;
        }

        engine(db).rebuild(&CancellationToken::new()).await.unwrap();

        let co_edges: Vec<_> = all_edges(&conn)
            .await
            .into_iter()
            .filter(|(source, _, _, basis)| *source == 1 && basis == "CO_PURCHASE")
            .collect();
        assert!(
            co_edges.is_empty(),
            "repeat purchases by one user must not clear the agreement floor"
        );
    }

    #[tokio::test]
    async fn test_purchases_outside_window_ignored() {
        let (conn, db) = setup_test_db().await;
        insert_product(&conn, 1, "A", true).await;
        insert_product(&conn, 2, "B", true).await;

        let now = Utc::now();
        let stale = now - Duration::days(120);
        insert_activity(&conn, Some(1), 1, ActivityAction::Purchase, now).await;
        insert_activity(&conn, Some(2), 1, ActivityAction::Purchase, now).await;
        insert_activity(&conn, Some(1), 2, ActivityAction::Purchase, stale).await;
        insert_activity(&conn, Some(2), 2, ActivityAction::Purchase, stale).await;

        engine(db).rebuild(&CancellationToken::new()).await.unwrap();

        let co_edges: Vec<_> = all_edges(&conn)
            .await
            .into_iter()
            .filter(|(_, _, _, basis)| basis == "CO_PURCHASE")
            .collect();
        assert!(
            co_edges.iter().all(|(source, _, _, _)| *source != 1),
            "stale purchases must not feed the co-purchase signal"
        );
    }

    #[tokio::test]
    async fn test_rebuild_is_idempotent() {
        let (conn, db) = setup_test_db().await;
        insert_product(&conn, 1, "Shoes", true).await;
        insert_product(&conn, 2, "Shoes", true).await;
        insert_product(&conn, 3, "Shoes", true).await;

        let now = Utc::now();
        insert_activity(&conn, Some(1), 1, ActivityAction::Purchase, now).await;
        insert_activity(&conn, Some(2), 1, ActivityAction::Purchase, now).await;
        insert_activity(&conn, Some(1), 2, ActivityAction::Purchase, now).await;
        insert_activity(&conn, Some(2), 2, ActivityAction::Purchase, now).await;

        let engine = engine(db);
        engine.rebuild(&CancellationToken::new()).await.unwrap();
        let first: Vec<_> = all_edges(&conn)
            .await
            .into_iter()
            .map(|(s, t, score, basis)| (s, t, score.to_bits(), basis))
            .collect();

        engine.rebuild(&CancellationToken::new()).await.unwrap();
        let second: Vec<_> = all_edges(&conn)
            .await
            .into_iter()
            .map(|(s, t, score, basis)| (s, t, score.to_bits(), basis))
            .collect();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_cancelled_rebuild_stops_early() {
        let (conn, db) = setup_test_db().await;
        insert_product(&conn, 1, "Shoes", true).await;
        insert_product(&conn, 2, "Shoes", true).await;

        let token = CancellationToken::new();
        token.cancel();

        let summary = engine(db).rebuild(&token).await.unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.products_processed, 0);
        assert!(all_edges(&conn).await.is_empty());
    }
}
