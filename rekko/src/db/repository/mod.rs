mod activities;
mod catalog;
mod scores;
mod similarities;
mod users;

pub use activities::ActivityRepository;
pub use catalog::CatalogRepository;
pub use scores::ScoreRepository;
pub use similarities::SimilarityRepository;
pub use users::UserRepository;

use chrono::{DateTime, Utc};

use crate::error::{RekkoError, Result};

/// Stored timestamps are RFC 3339; a row that fails to parse is corrupt.
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RekkoError::Internal(format!("invalid stored timestamp '{value}': {e}")))
}
