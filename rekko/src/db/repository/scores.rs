use libsql::{params, Connection, Row};

use crate::error::Result;
use crate::models::UserProductScore;

use super::parse_timestamp;

pub struct ScoreRepository;

fn score_from_row(row: &Row) -> Result<UserProductScore> {
    let last_updated: String = row.get(4)?;
    Ok(UserProductScore {
        id: row.get(0)?,
        user_id: row.get(1)?,
        product_id: row.get(2)?,
        score: row.get(3)?,
        last_updated: parse_timestamp(&last_updated)?,
    })
}

impl ScoreRepository {
    pub async fn create(conn: &Connection, score: &UserProductScore) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO user_product_score (
                id, user_id, product_id, score, last_updated
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                score.id.clone(),
                score.user_id,
                score.product_id,
                score.score,
                score.last_updated.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn top_for_user(
        conn: &Connection,
        user_id: i64,
        limit: u32,
    ) -> Result<Vec<UserProductScore>> {
        let mut rows = conn
            .query(
                "SELECT id, user_id, product_id, score, last_updated \
                 FROM user_product_score WHERE user_id = ?1 \
                 ORDER BY score DESC LIMIT ?2",
                params![user_id, limit as i64],
            )
            .await?;

        let mut scores = Vec::new();
        while let Some(row) = rows.next().await? {
            scores.push(score_from_row(&row)?);
        }
        Ok(scores)
    }

    pub async fn delete_for_user(conn: &Connection, user_id: i64) -> Result<u64> {
        let affected = conn
            .execute(
                "DELETE FROM user_product_score WHERE user_id = ?1",
                params![user_id],
            )
            .await?;
        Ok(affected)
    }

    pub async fn count(conn: &Connection) -> Result<u64> {
        let row = conn
            .query("SELECT COUNT(*) FROM user_product_score", ())
            .await?
            .next()
            .await?;

        match row {
            Some(row) => {
                let count: i64 = row.get(0)?;
                Ok(count as u64)
            }
            None => Ok(0),
        }
    }

    pub async fn delete_all(conn: &Connection) -> Result<u64> {
        let affected = conn.execute("DELETE FROM user_product_score", ()).await?;
        Ok(affected)
    }
}
