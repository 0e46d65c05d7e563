use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::matcher::DEFAULT_THRESHOLD;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Catalog dataset (titles with global scores)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Personal ratings dataset
    #[serde(default = "default_ratings_path")]
    pub ratings_path: String,

    /// Directory holding locally supplied poster images
    #[serde(default)]
    pub poster_dir: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Minimum similarity (0-100) for a fuzzy title match
    #[serde(default = "default_match_threshold")]
    pub match_threshold: u8,

    #[serde(default = "default_min_genre_count")]
    pub min_genre_count: usize,

    #[serde(default = "default_min_actor_count")]
    pub min_actor_count: usize,

    /// Minimum mean personal rating for a favorite, on the ratings file's own scale
    #[serde(default = "default_min_avg_rating")]
    pub min_avg_rating: f64,

    /// Upper bound of the catalog's global score scale
    #[serde(default = "default_global_score_scale")]
    pub global_score_scale: f64,

    #[serde(default = "default_weight_global")]
    pub weight_global: f64,

    #[serde(default = "default_weight_genre")]
    pub weight_genre: f64,

    #[serde(default = "default_weight_actor")]
    pub weight_actor: f64,

    /// Global score at which a candidate earns the "strong global rating" reason
    #[serde(default = "default_strong_global_score")]
    pub strong_global_score: f64,

    #[serde(default = "default_max_reasons")]
    pub max_reasons: usize,
}

fn default_catalog_path() -> String {
    "data/kdrama_catalog.csv".to_string()
}

fn default_ratings_path() -> String {
    "data/my_ratings.csv".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_match_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

fn default_min_genre_count() -> usize {
    3
}

fn default_min_actor_count() -> usize {
    2
}

fn default_min_avg_rating() -> f64 {
    9.0
}

fn default_global_score_scale() -> f64 {
    10.0
}

fn default_weight_global() -> f64 {
    0.5
}

fn default_weight_genre() -> f64 {
    0.3
}

fn default_weight_actor() -> f64 {
    0.2
}

fn default_strong_global_score() -> f64 {
    8.5
}

fn default_max_reasons() -> usize {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            ratings_path: default_ratings_path(),
            poster_dir: None,
            host: default_host(),
            port: default_port(),
            match_threshold: default_match_threshold(),
            min_genre_count: default_min_genre_count(),
            min_actor_count: default_min_actor_count(),
            min_avg_rating: default_min_avg_rating(),
            global_score_scale: default_global_score_scale(),
            weight_global: default_weight_global(),
            weight_genre: default_weight_genre(),
            weight_actor: default_weight_actor(),
            strong_global_score: default_strong_global_score(),
            max_reasons: default_max_reasons(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.match_threshold > 100 {
            return Err(AppError::InvalidInput(format!(
                "MATCH_THRESHOLD must be within 0..=100, got {}",
                self.match_threshold
            )));
        }
        if !self.min_avg_rating.is_finite() {
            return Err(AppError::InvalidInput(format!(
                "MIN_AVG_RATING must be a finite number, got {}",
                self.min_avg_rating
            )));
        }
        if !self.strong_global_score.is_finite() {
            return Err(AppError::InvalidInput(format!(
                "STRONG_GLOBAL_SCORE must be a finite number, got {}",
                self.strong_global_score
            )));
        }
        if !self.global_score_scale.is_finite() || self.global_score_scale <= 0.0 {
            return Err(AppError::InvalidInput(
                "GLOBAL_SCORE_SCALE must be positive".to_string(),
            ));
        }
        if [self.weight_global, self.weight_genre, self.weight_actor]
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
        {
            return Err(AppError::InvalidInput(
                "Scoring weights must be finite and non-negative".to_string(),
            ));
        }
        if self.max_reasons == 0 {
            return Err(AppError::InvalidInput(
                "MAX_REASONS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Tuning knobs handed to the matching, aggregation and scoring stages
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            match_threshold: self.match_threshold,
            favorites: FavoriteThresholds {
                min_genre_count: self.min_genre_count,
                min_actor_count: self.min_actor_count,
                min_avg_rating: self.min_avg_rating,
            },
            scoring: ScoringConfig {
                global_score_scale: self.global_score_scale,
                weight_global: self.weight_global,
                weight_genre: self.weight_genre,
                weight_actor: self.weight_actor,
                strong_global_score: self.strong_global_score,
                max_reasons: self.max_reasons,
            },
        }
    }
}

/// Configuration for one run of the insights pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub match_threshold: u8,
    pub favorites: FavoriteThresholds,
    pub scoring: ScoringConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Config::default().pipeline()
    }
}

/// Cut-offs a category must clear to count as a favorite
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteThresholds {
    pub min_genre_count: usize,
    pub min_actor_count: usize,
    pub min_avg_rating: f64,
}

/// Weights of the linear recommendation score and explanation settings
///
/// `reco_score = weight_global * (global / scale) + weight_genre * genre_overlap
///               + weight_actor * actor_overlap`
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub global_score_scale: f64,
    pub weight_global: f64,
    pub weight_genre: f64,
    pub weight_actor: f64,
    pub strong_global_score: f64,
    pub max_reasons: usize,
}
