use serde::{Deserialize, Serialize};

/// Read-only view of a catalog product. The catalog is owned by the
/// storefront; the engine only ever queries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub price: f64,
    pub is_active: bool,
}
