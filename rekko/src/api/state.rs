use std::sync::Arc;

use crate::config::Config;
use crate::db::DatabaseBackend;
use crate::jobs::JobRegistry;
use crate::services::{
    ActivityRecorder, RecommendationRetriever, SimilarityEngine, TrendingEngine, UserScoreEngine,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn DatabaseBackend>,
    pub recorder: ActivityRecorder,
    pub similarity: SimilarityEngine,
    pub scores: UserScoreEngine,
    pub retriever: RecommendationRetriever,
    pub trending: TrendingEngine,
    pub jobs: JobRegistry,
}

impl AppState {
    pub fn new(config: Config, db: Arc<dyn DatabaseBackend>) -> Self {
        let config = Arc::new(config);
        let rec_config = config.recommendation.clone();

        let recorder = ActivityRecorder::new(db.clone(), rec_config.action_weights.clone());
        let similarity = SimilarityEngine::new(db.clone(), rec_config.clone());
        let scores = UserScoreEngine::new(db.clone(), rec_config.clone());
        let trending = TrendingEngine::new(db.clone(), rec_config.clone());
        let retriever = RecommendationRetriever::new(db.clone(), trending.clone(), rec_config);

        Self {
            config,
            db,
            recorder,
            similarity,
            scores,
            retriever,
            trending,
            jobs: JobRegistry::new(),
        }
    }
}
