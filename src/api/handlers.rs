use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::{Candidate, CategoryStat, Favorites, MergedRecord, SummaryStats};
use crate::services::{aggregator::desc_missing_last, Poster, PosterIndex};

use super::AppState;

const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;
const MAX_RECOMMENDATION_LIMIT: usize = 100;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub min_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub total_candidates: usize,
    pub recommendations: Vec<Candidate>,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub title: String,
    pub rating: Option<f64>,
    pub matched_title: Option<String>,
    pub global_score: Option<f64>,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub poster: Poster,
}

impl RatingResponse {
    fn new(record: &MergedRecord, posters: &PosterIndex) -> Self {
        let catalog = record.catalog.as_ref();
        let img_url = catalog.and_then(|c| c.img_url.as_deref());

        Self {
            title: record.display_title().to_string(),
            rating: record.rating(),
            matched_title: catalog.map(|c| c.title.clone()),
            global_score: record.global_score(),
            year: catalog.and_then(|c| c.year),
            genres: catalog.map(|c| c.genres.clone()).unwrap_or_default(),
            poster: posters.resolve(record.display_title(), img_url),
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Headline numbers
pub async fn get_summary(State(state): State<AppState>) -> AppResult<Json<SummaryStats>> {
    let insights = state.insights().await?;
    Ok(Json(insights.summary.clone()))
}

/// Per-genre statistics
pub async fn get_genre_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<Vec<CategoryStat>>> {
    let insights = state.insights().await?;
    Ok(Json(filter_stats(&insights.genre_stats, query.min_count)))
}

/// Per-actor statistics
pub async fn get_actor_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<Vec<CategoryStat>>> {
    let insights = state.insights().await?;
    Ok(Json(filter_stats(&insights.actor_stats, query.min_count)))
}

fn filter_stats(stats: &[CategoryStat], min_count: Option<usize>) -> Vec<CategoryStat> {
    let min_count = min_count.unwrap_or(1);
    stats
        .iter()
        .filter(|s| s.count >= min_count)
        .cloned()
        .collect()
}

/// Favorite genres and actors
pub async fn get_favorites(State(state): State<AppState>) -> AppResult<Json<Favorites>> {
    let insights = state.insights().await?;
    Ok(Json(insights.favorites.clone()))
}

/// Top ranked recommendations
pub async fn get_recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationsResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_RECOMMENDATION_LIMIT);
    if !(1..=MAX_RECOMMENDATION_LIMIT).contains(&limit) {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}",
            MAX_RECOMMENDATION_LIMIT
        )));
    }

    let insights = state.insights().await?;
    Ok(Json(RecommendationsResponse {
        total_candidates: insights.candidates.len(),
        recommendations: insights.top_candidates(limit).to_vec(),
    }))
}

/// Every rated title, best rated first
pub async fn get_ratings(State(state): State<AppState>) -> AppResult<Json<Vec<RatingResponse>>> {
    let (insights, posters) = tokio::try_join!(state.insights(), state.poster_index())?;

    let mut records: Vec<&MergedRecord> = insights.merged.iter().collect();
    records.sort_by(|a, b| desc_missing_last(a.rating(), b.rating()));

    Ok(Json(
        records
            .into_iter()
            .map(|r| RatingResponse::new(r, &posters))
            .collect(),
    ))
}

/// Ratings that could not be joined to a scored catalog row
pub async fn get_unmatched(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RatingResponse>>> {
    let (insights, posters) = tokio::try_join!(state.insights(), state.poster_index())?;
    Ok(Json(
        insights
            .unmatched()
            .map(|r| RatingResponse::new(r, &posters))
            .collect(),
    ))
}
