use chrono::{DateTime, Utc};
use libsql::{params, Connection, Row};

use crate::error::Result;
use crate::models::{ActivityAction, ActivityEvent};

use super::parse_timestamp;

pub struct ActivityRepository;

fn event_from_row(row: &Row) -> Result<ActivityEvent> {
    let timestamp: String = row.get(4)?;
    Ok(ActivityEvent {
        id: row.get(0)?,
        user_id: row.get(1)?,
        product_id: row.get(2)?,
        action: row.get(3)?,
        timestamp: parse_timestamp(&timestamp)?,
        session_id: row.get(5)?,
        weight: row.get(6)?,
    })
}

const EVENT_COLUMNS: &str = "id, user_id, product_id, action, timestamp, session_id, weight";

impl ActivityRepository {
    pub async fn create(conn: &Connection, event: &ActivityEvent) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO user_activity (
                id, user_id, product_id, action, timestamp, session_id, weight
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                event.id.clone(),
                event.user_id,
                event.product_id,
                event.action.clone(),
                event.timestamp.to_rfc3339(),
                event.session_id.clone(),
                event.weight,
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_user_since(
        conn: &Connection,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityEvent>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM user_activity \
             WHERE user_id = ?1 AND timestamp >= ?2 ORDER BY timestamp"
        );
        let mut rows = conn
            .query(&sql, params![user_id, since.to_rfc3339()])
            .await?;

        let mut events = Vec::new();
        while let Some(row) = rows.next().await? {
            events.push(event_from_row(&row)?);
        }
        Ok(events)
    }

    pub async fn get_purchasers(conn: &Connection, product_id: i64) -> Result<Vec<i64>> {
        let mut rows = conn
            .query(
                "SELECT DISTINCT user_id FROM user_activity \
                 WHERE product_id = ?1 AND action = ?2 AND user_id IS NOT NULL",
                params![product_id, ActivityAction::Purchase.as_str()],
            )
            .await?;

        let mut user_ids = Vec::new();
        while let Some(row) = rows.next().await? {
            user_ids.push(row.get(0)?);
        }
        Ok(user_ids)
    }

    pub async fn get_user_purchases_since(
        conn: &Connection,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityEvent>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM user_activity \
             WHERE user_id = ?1 AND action = ?2 AND timestamp >= ?3 ORDER BY timestamp"
        );
        let mut rows = conn
            .query(
                &sql,
                params![
                    user_id,
                    ActivityAction::Purchase.as_str(),
                    since.to_rfc3339()
                ],
            )
            .await?;

        let mut events = Vec::new();
        while let Some(row) = rows.next().await? {
            events.push(event_from_row(&row)?);
        }
        Ok(events)
    }

    pub async fn get_purchases_since(
        conn: &Connection,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityEvent>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM user_activity \
             WHERE action = ?1 AND timestamp >= ?2 ORDER BY timestamp"
        );
        let mut rows = conn
            .query(
                &sql,
                params![ActivityAction::Purchase.as_str(), since.to_rfc3339()],
            )
            .await?;

        let mut events = Vec::new();
        while let Some(row) = rows.next().await? {
            events.push(event_from_row(&row)?);
        }
        Ok(events)
    }

    pub async fn count(conn: &Connection) -> Result<u64> {
        let row = conn
            .query("SELECT COUNT(*) FROM user_activity", ())
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

    pub async fn count_purchases_since(conn: &Connection, since: DateTime<Utc>) -> Result<u64> {
        let row = conn
            .query(
                "SELECT COUNT(*) FROM user_activity WHERE action = ?1 AND timestamp >= ?2",
                params![ActivityAction::Purchase.as_str(), since.to_rfc3339()],
            )
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
        let affected = conn.execute("DELETE FROM user_activity", ()).await?;
        Ok(affected)
    }
}
