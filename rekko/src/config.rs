use serde::Deserialize;
use std::collections::HashMap;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// Parse `REKKO_ACTION_WEIGHTS` env var.
/// Format: comma-separated `action:weight` pairs, e.g. `VIEW:1.0,CLICK:2.0,PURCHASE:10.0`
fn parse_action_weights() -> Option<HashMap<String, f64>> {
    match env::var("REKKO_ACTION_WEIGHTS") {
        Ok(val) if !val.is_empty() => Some(
            val.split(',')
                .filter_map(|pair| {
                    let mut parts = pair.splitn(2, ':');
                    let action = parts.next()?.trim();
                    let weight = parts.next()?.trim();
                    match weight.parse::<f64>() {
                        Ok(w) if !action.is_empty() => Some((action.to_string(), w)),
                        _ => {
                            tracing::warn!(
                                "Invalid action weight pair '{}' in REKKO_ACTION_WEIGHTS, skipping",
                                pair
                            );
                            None
                        }
                    }
                })
                .collect(),
        ),
        _ => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub recommendation: RecommendationConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
}

/// Per-action event weights, captured into each activity row at write time.
///
/// The table is injectable so deployments can tune how strongly each kind of
/// interaction counts; rows written under an older table keep their weight.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionWeights {
    weights: HashMap<String, f64>,
    default_weight: f64,
}

impl ActionWeights {
    pub fn new(weights: HashMap<String, f64>, default_weight: f64) -> Self {
        Self {
            weights,
            default_weight,
        }
    }

    pub fn weight_for(&self, action: &str) -> f64 {
        self.weights
            .get(action)
            .copied()
            .unwrap_or(self.default_weight)
    }
}

impl Default for ActionWeights {
    fn default() -> Self {
        let weights = HashMap::from([
            ("VIEW".to_string(), 1.0),
            ("CLICK".to_string(), 2.0),
            ("ADD_TO_CART".to_string(), 5.0),
            ("PURCHASE".to_string(), 10.0),
        ]);
        Self {
            weights,
            default_weight: 1.0,
        }
    }
}

/// Tunables for the batch engines and the read path.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationConfig {
    pub action_weights: ActionWeights,
    /// Lookback for per-user score accumulation (days).
    pub score_window_days: i64,
    /// Lookback for co-purchase pairing (days).
    pub copurchase_window_days: i64,
    /// Lookback for the live recommendation tier (days).
    pub live_window_days: i64,
    /// Lookback for trending purchase counts (days).
    pub trending_window_days: i64,
    /// Fixed score for same-category edges.
    pub category_edge_score: f64,
    /// Max same-category neighbors per product.
    pub category_edge_limit: u32,
    /// Minimum distinct co-purchasers before an edge is emitted.
    pub copurchase_min_buyers: u64,
    /// Attenuation applied to propagated (edge-hop) score contributions.
    pub propagation_decay: f64,
    /// Edges consulted per activity event during score propagation.
    pub propagation_edge_limit: u32,
    /// Edges consulted per activity event on the live recommendation tier.
    pub live_edge_limit: u32,
    /// Precomputed score rows read per personalized request.
    pub score_read_limit: u32,
    /// Edges read per similar-products request.
    pub edge_read_limit: u32,
    /// Users per block in a bulk score rebuild before pausing.
    pub rebuild_batch_size: usize,
    /// Pause between bulk rebuild blocks (milliseconds).
    pub rebuild_batch_pause_ms: u64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            action_weights: ActionWeights::default(),
            score_window_days: 90,
            copurchase_window_days: 90,
            live_window_days: 30,
            trending_window_days: 7,
            category_edge_score: 0.7,
            category_edge_limit: 10,
            copurchase_min_buyers: 2,
            propagation_decay: 0.5,
            propagation_edge_limit: 5,
            live_edge_limit: 10,
            score_read_limit: 20,
            edge_read_limit: 10,
            rebuild_batch_size: 100,
            rebuild_batch_pause_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// Full similarity graph rebuild interval (seconds). Nightly by default.
    pub similarity_interval_secs: u64,
    /// Bulk user score rebuild interval (seconds). Every 6 hours by default.
    pub scores_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let api_keys = env::var("REKKO_API_KEYS")
            .unwrap_or_default()
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        let defaults = RecommendationConfig::default();
        let action_weights = match parse_action_weights() {
            Some(weights) => ActionWeights::new(
                weights,
                parse_env_or("REKKO_DEFAULT_ACTION_WEIGHT", 1.0),
            ),
            None => ActionWeights::default(),
        };

        Self {
            server: ServerConfig {
                host: env::var("REKKO_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("REKKO_PORT", 3000),
                api_keys,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:rekko.db".to_string()),
                auth_token: parse_env_opt("DATABASE_AUTH_TOKEN"),
                local_path: parse_env_opt("DATABASE_LOCAL_PATH"),
            },
            recommendation: RecommendationConfig {
                action_weights,
                score_window_days: parse_env_or(
                    "REKKO_SCORE_WINDOW_DAYS",
                    defaults.score_window_days,
                ),
                copurchase_window_days: parse_env_or(
                    "REKKO_COPURCHASE_WINDOW_DAYS",
                    defaults.copurchase_window_days,
                ),
                live_window_days: parse_env_or(
                    "REKKO_LIVE_WINDOW_DAYS",
                    defaults.live_window_days,
                ),
                trending_window_days: parse_env_or(
                    "REKKO_TRENDING_WINDOW_DAYS",
                    defaults.trending_window_days,
                ),
                category_edge_score: parse_env_or(
                    "REKKO_CATEGORY_EDGE_SCORE",
                    defaults.category_edge_score,
                ),
                category_edge_limit: parse_env_or(
                    "REKKO_CATEGORY_EDGE_LIMIT",
                    defaults.category_edge_limit,
                ),
                copurchase_min_buyers: parse_env_or(
                    "REKKO_COPURCHASE_MIN_BUYERS",
                    defaults.copurchase_min_buyers,
                ),
                propagation_decay: parse_env_or(
                    "REKKO_PROPAGATION_DECAY",
                    defaults.propagation_decay,
                ),
                propagation_edge_limit: parse_env_or(
                    "REKKO_PROPAGATION_EDGE_LIMIT",
                    defaults.propagation_edge_limit,
                ),
                live_edge_limit: parse_env_or("REKKO_LIVE_EDGE_LIMIT", defaults.live_edge_limit),
                score_read_limit: parse_env_or(
                    "REKKO_SCORE_READ_LIMIT",
                    defaults.score_read_limit,
                ),
                edge_read_limit: parse_env_or("REKKO_EDGE_READ_LIMIT", defaults.edge_read_limit),
                rebuild_batch_size: parse_env_or(
                    "REKKO_REBUILD_BATCH_SIZE",
                    defaults.rebuild_batch_size,
                ),
                rebuild_batch_pause_ms: parse_env_or(
                    "REKKO_REBUILD_BATCH_PAUSE_MS",
                    defaults.rebuild_batch_pause_ms,
                ),
            },
            scheduler: SchedulerConfig {
                enabled: parse_env_or("REKKO_SCHEDULER_ENABLED", true),
                similarity_interval_secs: parse_env_or("REKKO_SIMILARITY_INTERVAL_SECS", 86_400),
                scores_interval_secs: parse_env_or("REKKO_SCORES_INTERVAL_SECS", 21_600),
            },
        }
    }
}
