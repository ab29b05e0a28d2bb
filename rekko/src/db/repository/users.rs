use libsql::Connection;

use crate::error::Result;

pub struct UserRepository;

impl UserRepository {
    pub async fn get_all_ids(conn: &Connection) -> Result<Vec<i64>> {
        let mut rows = conn.query("SELECT id FROM users ORDER BY id", ()).await?;

        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }
}
