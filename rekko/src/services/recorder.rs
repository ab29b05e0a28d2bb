use std::sync::Arc;

use tracing::{debug, error};

use crate::config::ActionWeights;
use crate::db::DatabaseBackend;
use crate::models::ActivityEvent;

/// Appends interaction events to the activity log.
///
/// Recording is best-effort: a storage failure is logged and swallowed so
/// tracking can never break the caller's primary flow. The weight is looked
/// up from the action-weight table once, at write time.
#[derive(Clone)]
pub struct ActivityRecorder {
    db: Arc<dyn DatabaseBackend>,
    weights: ActionWeights,
}

impl ActivityRecorder {
    pub fn new(db: Arc<dyn DatabaseBackend>, weights: ActionWeights) -> Self {
        Self { db, weights }
    }

    pub async fn record(
        &self,
        user_id: Option<i64>,
        product_id: i64,
        action: &str,
        session_id: &str,
    ) {
        let weight = self.weights.weight_for(action);
        let event = ActivityEvent::new(user_id, product_id, action, session_id, weight);

        match self.db.append_activity(&event).await {
            Ok(()) => {
                debug!(?user_id, product_id, action, weight, "Activity recorded");
            }
            Err(e) => {
                error!(?user_id, product_id, action, error = %e, "Failed to record activity");
            }
        }
    }
}
