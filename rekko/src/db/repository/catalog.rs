use libsql::{params, Connection, Row};

use crate::error::Result;
use crate::models::Product;

pub struct CatalogRepository;

fn product_from_row(row: &Row) -> Result<Product> {
    let is_active: i64 = row.get(4)?;
    Ok(Product {
        id: row.get(0)?,
        title: row.get(1)?,
        category: row.get(2)?,
        price: row.get(3)?,
        is_active: is_active != 0,
    })
}

const PRODUCT_COLUMNS: &str = "id, title, category, price, is_active";

impl CatalogRepository {
    pub async fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let row = conn.query(&sql, params![id]).await?.next().await?;

        match row {
            Some(row) => Ok(Some(product_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_active(conn: &Connection) -> Result<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY id");
        let mut rows = conn.query(&sql, ()).await?;

        let mut products = Vec::new();
        while let Some(row) = rows.next().await? {
            products.push(product_from_row(&row)?);
        }
        Ok(products)
    }

    pub async fn get_by_category(conn: &Connection, category: &str) -> Result<Vec<Product>> {
        let sql =
            format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE category = ?1 ORDER BY id");
        let mut rows = conn.query(&sql, params![category]).await?;

        let mut products = Vec::new();
        while let Some(row) = rows.next().await? {
            products.push(product_from_row(&row)?);
        }
        Ok(products)
    }

    pub async fn get_by_ids(conn: &Connection, ids: &[i64]) -> Result<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql =
            format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ({placeholders})");
        let values: Vec<libsql::Value> = ids.iter().map(|&id| libsql::Value::from(id)).collect();
        let mut rows = conn.query(&sql, values).await?;

        let mut products = Vec::new();
        while let Some(row) = rows.next().await? {
            products.push(product_from_row(&row)?);
        }
        Ok(products)
    }
}
