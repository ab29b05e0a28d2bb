use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Append-only interaction log
        CREATE TABLE IF NOT EXISTS user_activity (
            id TEXT PRIMARY KEY,
            user_id INTEGER,
            product_id INTEGER NOT NULL,
            action TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            session_id TEXT NOT NULL,
            weight REAL NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_activity_user_id ON user_activity(user_id);
        CREATE INDEX IF NOT EXISTS idx_activity_product_id ON user_activity(product_id);
        CREATE INDEX IF NOT EXISTS idx_activity_user_timestamp ON user_activity(user_id, timestamp);
        CREATE INDEX IF NOT EXISTS idx_activity_action_timestamp ON user_activity(action, timestamp);

        -- Similarity graph, fully rebuilt on every run
        CREATE TABLE IF NOT EXISTS product_similarity (
            id TEXT PRIMARY KEY,
            product_id INTEGER NOT NULL,
            similar_product_id INTEGER NOT NULL,
            similarity_score REAL NOT NULL,
            basis TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_similarity_product_id ON product_similarity(product_id);
        CREATE INDEX IF NOT EXISTS idx_similarity_product_score
            ON product_similarity(product_id, similarity_score);

        -- Per-user affinity rows, replaced per user on every score run
        CREATE TABLE IF NOT EXISTS user_product_score (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            product_id INTEGER NOT NULL,
            score REAL NOT NULL,
            last_updated TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_score_user_id ON user_product_score(user_id);
        CREATE INDEX IF NOT EXISTS idx_score_user_score ON user_product_score(user_id, score);

        -- Storefront-owned tables. The engine only reads these; they are
        -- created here for deployments where the engine shares the
        -- storefront database (and for tests).
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            category TEXT NOT NULL,
            price REAL NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1
        );

        CREATE INDEX IF NOT EXISTS idx_products_category ON products(category);
        CREATE INDEX IF NOT EXISTS idx_products_is_active ON products(is_active);

        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            email TEXT,
            role TEXT NOT NULL DEFAULT 'ROLE_USER'
        );
        "#,
    )
    .await?;

    Ok(())
}
