use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical interaction kinds. Events carry the raw action string, so
/// unrecognized actions are still recorded (at the default weight); this enum
/// names the values the engine itself filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    View,
    Click,
    AddToCart,
    Purchase,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::View => "VIEW",
            ActivityAction::Click => "CLICK",
            ActivityAction::AddToCart => "ADD_TO_CART",
            ActivityAction::Purchase => "PURCHASE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "VIEW" => Some(ActivityAction::View),
            "CLICK" => Some(ActivityAction::Click),
            "ADD_TO_CART" => Some(ActivityAction::AddToCart),
            "PURCHASE" => Some(ActivityAction::Purchase),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded user-product interaction. Append-only: never mutated after
/// creation, deleted only by an administrative purge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub id: String,
    /// Absent for anonymous sessions; `session_id` correlates those.
    pub user_id: Option<i64>,
    pub product_id: i64,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    /// Derived from the action-weight table at write time and frozen.
    pub weight: f64,
}

impl ActivityEvent {
    pub fn new(
        user_id: Option<i64>,
        product_id: i64,
        action: &str,
        session_id: &str,
        weight: f64,
    ) -> Self {
        Self {
            id: nanoid::nanoid!(),
            user_id,
            product_id,
            action: action.to_string(),
            timestamp: Utc::now(),
            session_id: session_id.to_string(),
            weight,
        }
    }
}
