use serde::{Deserialize, Serialize};

/// Signal that produced a similarity edge. Edges for the same ordered product
/// pair may coexist under different bases; they are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimilarityBasis {
    Category,
    CoPurchase,
}

impl SimilarityBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityBasis::Category => "CATEGORY",
            SimilarityBasis::CoPurchase => "CO_PURCHASE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CATEGORY" => Some(SimilarityBasis::Category),
            "CO_PURCHASE" => Some(SimilarityBasis::CoPurchase),
            _ => None,
        }
    }
}

impl std::fmt::Display for SimilarityBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed "product A is similar to product B" edge. The whole edge set is
/// rebuilt from scratch on every similarity run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityEdge {
    pub id: String,
    pub product_id: i64,
    pub similar_product_id: i64,
    pub similarity_score: f64,
    pub basis: SimilarityBasis,
}

impl SimilarityEdge {
    pub fn new(
        product_id: i64,
        similar_product_id: i64,
        similarity_score: f64,
        basis: SimilarityBasis,
    ) -> Self {
        Self {
            id: nanoid::nanoid!(),
            product_id,
            similar_product_id,
            similarity_score,
            basis,
        }
    }
}
