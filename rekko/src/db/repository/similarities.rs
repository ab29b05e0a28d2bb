use libsql::{params, Connection, Row};

use crate::error::{RekkoError, Result};
use crate::models::{SimilarityBasis, SimilarityEdge};

pub struct SimilarityRepository;

fn edge_from_row(row: &Row) -> Result<SimilarityEdge> {
    let basis: String = row.get(4)?;
    Ok(SimilarityEdge {
        id: row.get(0)?,
        product_id: row.get(1)?,
        similar_product_id: row.get(2)?,
        similarity_score: row.get(3)?,
        basis: SimilarityBasis::parse(&basis)
            .ok_or_else(|| RekkoError::Internal(format!("unknown similarity basis '{basis}'")))?,
    })
}

impl SimilarityRepository {
    pub async fn create(conn: &Connection, edge: &SimilarityEdge) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO product_similarity (
                id, product_id, similar_product_id, similarity_score, basis
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                edge.id.clone(),
                edge.product_id,
                edge.similar_product_id,
                edge.similarity_score,
                edge.basis.as_str(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn top_for_product(
        conn: &Connection,
        product_id: i64,
        limit: u32,
    ) -> Result<Vec<SimilarityEdge>> {
        let mut rows = conn
            .query(
                "SELECT id, product_id, similar_product_id, similarity_score, basis \
                 FROM product_similarity WHERE product_id = ?1 \
                 ORDER BY similarity_score DESC LIMIT ?2",
                params![product_id, limit as i64],
            )
            .await?;

        let mut edges = Vec::new();
        while let Some(row) = rows.next().await? {
            edges.push(edge_from_row(&row)?);
        }
        Ok(edges)
    }

    pub async fn count(conn: &Connection) -> Result<u64> {
        let row = conn
            .query("SELECT COUNT(*) FROM product_similarity", ())
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
        let affected = conn.execute("DELETE FROM product_similarity", ()).await?;
        Ok(affected)
    }
}
