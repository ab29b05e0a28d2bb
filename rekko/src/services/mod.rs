mod recorder;
mod retriever;
mod similarity;
mod trending;
mod user_scores;

pub use recorder::ActivityRecorder;
pub use retriever::{RankedRecommendations, RecommendationRetriever, RecommendationSource};
pub use similarity::{SimilarityEngine, SimilarityRebuildSummary};
pub use trending::TrendingEngine;
pub use user_scores::UserScoreEngine;

use std::collections::HashMap;

use crate::models::Product;

/// Reorder resolved products to match the ranked candidate id order, dropping
/// duplicate ids. Catalog batch lookups do not preserve input order.
pub(crate) fn in_ranked_order(ids: &[i64], products: Vec<Product>) -> Vec<Product> {
    let mut by_id: HashMap<i64, Product> = products.into_iter().map(|p| (p.id, p)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn product(id: i64) -> Product {
        Product {
            id,
            title: format!("p{id}"),
            category: "c".to_string(),
            price: 1.0,
            is_active: true,
        }
    }

    #[test]
    fn in_ranked_order_restores_rank_and_dedupes() {
        let resolved = vec![product(3), product(1), product(2)];
        let ordered = in_ranked_order(&[2, 2, 3, 1], resolved);
        let ids: Vec<i64> = ordered.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn in_ranked_order_skips_unresolved_ids() {
        let ordered = in_ranked_order(&[5, 1], vec![product(1)]);
        let ids: Vec<i64> = ordered.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1]);
    }
}
