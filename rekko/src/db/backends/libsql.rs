use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::connection::Database;
use crate::db::repository::{
    ActivityRepository, CatalogRepository, ScoreRepository, SimilarityRepository, UserRepository,
};
use crate::db::traits::{
    ActivityStore, CatalogStore, DatabaseBackend, ScoreStore, SimilarityStore, UserDirectory,
};
use crate::error::Result;
use crate::models::{ActivityEvent, Product, SimilarityEdge, UserProductScore};

pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivityStore for LibSqlBackend {
    async fn append_activity(&self, event: &ActivityEvent) -> Result<()> {
        let conn = self.db.connect()?;
        ActivityRepository::create(&conn, event).await
    }
    async fn get_user_activities_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityEvent>> {
        let conn = self.db.connect()?;
        ActivityRepository::get_by_user_since(&conn, user_id, since).await
    }
    async fn get_purchasers(&self, product_id: i64) -> Result<Vec<i64>> {
        let conn = self.db.connect()?;
        ActivityRepository::get_purchasers(&conn, product_id).await
    }
    async fn get_user_purchases_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityEvent>> {
        let conn = self.db.connect()?;
        ActivityRepository::get_user_purchases_since(&conn, user_id, since).await
    }
    async fn get_purchases_since(&self, since: DateTime<Utc>) -> Result<Vec<ActivityEvent>> {
        let conn = self.db.connect()?;
        ActivityRepository::get_purchases_since(&conn, since).await
    }
    async fn count_activities(&self) -> Result<u64> {
        let conn = self.db.connect()?;
        ActivityRepository::count(&conn).await
    }
    async fn count_purchases_since(&self, since: DateTime<Utc>) -> Result<u64> {
        let conn = self.db.connect()?;
        ActivityRepository::count_purchases_since(&conn, since).await
    }
    async fn delete_all_activities(&self) -> Result<u64> {
        let conn = self.db.connect()?;
        ActivityRepository::delete_all(&conn).await
    }
}

#[async_trait]
impl SimilarityStore for LibSqlBackend {
    async fn insert_similarity(&self, edge: &SimilarityEdge) -> Result<()> {
        let conn = self.db.connect()?;
        SimilarityRepository::create(&conn, edge).await
    }
    async fn top_similarities(&self, product_id: i64, limit: u32) -> Result<Vec<SimilarityEdge>> {
        let conn = self.db.connect()?;
        SimilarityRepository::top_for_product(&conn, product_id, limit).await
    }
    async fn count_similarities(&self) -> Result<u64> {
        let conn = self.db.connect()?;
        SimilarityRepository::count(&conn).await
    }
    async fn delete_all_similarities(&self) -> Result<u64> {
        let conn = self.db.connect()?;
        SimilarityRepository::delete_all(&conn).await
    }
}

#[async_trait]
impl ScoreStore for LibSqlBackend {
    async fn insert_score(&self, score: &UserProductScore) -> Result<()> {
        let conn = self.db.connect()?;
        ScoreRepository::create(&conn, score).await
    }
    async fn top_scores_for_user(
        &self,
        user_id: i64,
        limit: u32,
    ) -> Result<Vec<UserProductScore>> {
        let conn = self.db.connect()?;
        ScoreRepository::top_for_user(&conn, user_id, limit).await
    }
    async fn delete_scores_for_user(&self, user_id: i64) -> Result<u64> {
        let conn = self.db.connect()?;
        ScoreRepository::delete_for_user(&conn, user_id).await
    }
    async fn count_scores(&self) -> Result<u64> {
        let conn = self.db.connect()?;
        ScoreRepository::count(&conn).await
    }
    async fn delete_all_scores(&self) -> Result<u64> {
        let conn = self.db.connect()?;
        ScoreRepository::delete_all(&conn).await
    }
}

#[async_trait]
impl CatalogStore for LibSqlBackend {
    async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let conn = self.db.connect()?;
        CatalogRepository::get_by_id(&conn, id).await
    }
    async fn get_active_products(&self) -> Result<Vec<Product>> {
        let conn = self.db.connect()?;
        CatalogRepository::get_active(&conn).await
    }
    async fn get_products_by_category(&self, category: &str) -> Result<Vec<Product>> {
        let conn = self.db.connect()?;
        CatalogRepository::get_by_category(&conn, category).await
    }
    async fn get_products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>> {
        let conn = self.db.connect()?;
        CatalogRepository::get_by_ids(&conn, ids).await
    }
}

#[async_trait]
impl UserDirectory for LibSqlBackend {
    async fn get_all_user_ids(&self) -> Result<Vec<i64>> {
        let conn = self.db.connect()?;
        UserRepository::get_all_ids(&conn).await
    }
}

#[async_trait]
impl DatabaseBackend for LibSqlBackend {
    async fn sync(&self) -> Result<()> {
        self.db.sync().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::connection::Database;
    use crate::models::SimilarityBasis;
    use libsql::params;

    async fn setup_test_db() -> LibSqlBackend {
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
        let db = Database::new(&config)
            .await
            .expect("Failed to create database");

        LibSqlBackend::new(db)
    }

    #[tokio::test]
    async fn test_append_and_count_activities() {
        let backend = setup_test_db().await;

        let event = ActivityEvent::new(Some(1), 10, "VIEW", "sess-1", 1.0);
        backend.append_activity(&event).await.unwrap();
        let anon = ActivityEvent::new(None, 10, "CLICK", "sess-2", 2.0);
        backend.append_activity(&anon).await.unwrap();

        assert_eq!(backend.count_activities().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_get_purchasers_is_distinct_and_identified_only() {
        let backend = setup_test_db().await;

        for event in [
            ActivityEvent::new(Some(1), 10, "PURCHASE", "s1", 10.0),
            ActivityEvent::new(Some(1), 10, "PURCHASE", "s1", 10.0),
            ActivityEvent::new(Some(2), 10, "PURCHASE", "s2", 10.0),
            ActivityEvent::new(None, 10, "PURCHASE", "s3", 10.0),
            ActivityEvent::new(Some(3), 10, "VIEW", "s4", 1.0),
        ] {
            backend.append_activity(&event).await.unwrap();
        }

        let mut purchasers = backend.get_purchasers(10).await.unwrap();
        purchasers.sort_unstable();
        assert_eq!(purchasers, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_top_similarities_ordered_by_score() {
        let backend = setup_test_db().await;

        for edge in [
            SimilarityEdge::new(1, 2, 0.7, SimilarityBasis::Category),
            SimilarityEdge::new(1, 3, 0.9, SimilarityBasis::CoPurchase),
            SimilarityEdge::new(1, 4, 0.4, SimilarityBasis::CoPurchase),
            SimilarityEdge::new(2, 5, 1.0, SimilarityBasis::Category),
        ] {
            backend.insert_similarity(&edge).await.unwrap();
        }

        let top = backend.top_similarities(1, 2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].similar_product_id, 3);
        assert_eq!(top[1].similar_product_id, 2);
        assert_eq!(top[1].basis, SimilarityBasis::Category);
    }

    #[tokio::test]
    async fn test_scores_replace_per_user() {
        let backend = setup_test_db().await;
        let now = Utc::now();

        backend
            .insert_score(&UserProductScore::new(1, 10, 5.0, now))
            .await
            .unwrap();
        backend
            .insert_score(&UserProductScore::new(1, 11, 8.0, now))
            .await
            .unwrap();
        backend
            .insert_score(&UserProductScore::new(2, 10, 3.0, now))
            .await
            .unwrap();

        assert_eq!(backend.delete_scores_for_user(1).await.unwrap(), 2);
        assert_eq!(backend.count_scores().await.unwrap(), 1);

        let remaining = backend.top_scores_for_user(2, 20).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].product_id, 10);
    }

    #[tokio::test]
    async fn test_catalog_lookups() {
        let backend = setup_test_db().await;
        let conn = backend.db.connect().unwrap();

        for (id, title, category, active) in [
            (1, "Trail Runner", "Shoes", 1),
            (2, "Road Racer", "Shoes", 1),
            (3, "Retired Boot", "Shoes", 0),
            (4, "Rain Jacket", "Outerwear", 1),
        ] {
            conn.execute(
                "INSERT INTO products (id, title, category, price, is_active) VALUES (?1, ?2, ?3, 49.0, ?4)",
                params![id, title, category, active],
            )
            .await
            .unwrap();
        }

        let active = backend.get_active_products().await.unwrap();
        assert_eq!(active.len(), 3);

        let shoes = backend.get_products_by_category("Shoes").await.unwrap();
        assert_eq!(shoes.len(), 3);

        let by_ids = backend.get_products_by_ids(&[2, 4, 99]).await.unwrap();
        assert_eq!(by_ids.len(), 2);

        let missing = backend.get_product(99).await.unwrap();
        assert!(missing.is_none());

        let inactive = backend.get_product(3).await.unwrap().unwrap();
        assert!(!inactive.is_active);
    }

    #[tokio::test]
    async fn test_get_products_by_ids_empty_input() {
        let backend = setup_test_db().await;
        let products = backend.get_products_by_ids(&[]).await.unwrap();
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn test_user_directory() {
        let backend = setup_test_db().await;
        let conn = backend.db.connect().unwrap();

        for id in [3, 1, 2] {
            conn.execute(
                "INSERT INTO users (id, email) VALUES (?1, ?2)",
                params![id, format!("u{id}@example.com")],
            )
            .await
            .unwrap();
        }

        assert_eq!(backend.get_all_user_ids().await.unwrap(), vec![1, 2, 3]);
    }
}
