use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One user's precomputed affinity to a product. Purely relative: only the
/// ordering within a user's rows matters. Rows for a user are fully replaced
/// on every score run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProductScore {
    pub id: String,
    pub user_id: i64,
    pub product_id: i64,
    pub score: f64,
    pub last_updated: DateTime<Utc>,
}

impl UserProductScore {
    pub fn new(user_id: i64, product_id: i64, score: f64, last_updated: DateTime<Utc>) -> Self {
        Self {
            id: nanoid::nanoid!(),
            user_id,
            product_id,
            score,
            last_updated,
        }
    }
}
