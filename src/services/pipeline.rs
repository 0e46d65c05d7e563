use std::sync::Arc;

use chrono::Utc;

use crate::{
    config::PipelineConfig,
    data::{loader, CacheKey, DatasetSource, SessionCache},
    error::AppResult,
    models::{CatalogItem, CategoryField, Favorites, Insights, UserRating},
    services::{aggregator, exploder, merger, recommender, summary},
};

/// Runs the whole analysis over raw CSV bytes
pub fn build_insights(
    catalog_bytes: &[u8],
    ratings_bytes: &[u8],
    config: &PipelineConfig,
) -> AppResult<Insights> {
    let catalog = loader::parse_catalog(catalog_bytes)?;
    let ratings = loader::parse_ratings(ratings_bytes)?;
    Ok(analyze(catalog, ratings, config))
}

/// Runs the analysis over already parsed datasets
pub fn analyze(
    catalog: Vec<CatalogItem>,
    ratings: Vec<UserRating>,
    config: &PipelineConfig,
) -> Insights {
    let catalog_missing_score = catalog.iter().filter(|i| i.global_score.is_none()).count();
    if catalog_missing_score > 0 {
        tracing::warn!(
            count = catalog_missing_score,
            "Catalog rows without a global score are excluded from stats"
        );
    }

    let merged = merger::merge(&ratings, &catalog, config.match_threshold);
    let (matched, _) = merger::partition(&merged);

    let genre_rows = exploder::explode(matched.iter().copied(), CategoryField::Genre);
    let actor_rows = exploder::explode(matched.iter().copied(), CategoryField::Cast);
    let genre_stats = aggregator::aggregate(&genre_rows);
    let actor_stats = aggregator::aggregate(&actor_rows);

    let thresholds = &config.favorites;
    let favorites = Favorites {
        genres: aggregator::favorites(
            &genre_stats,
            thresholds.min_genre_count,
            thresholds.min_avg_rating,
        ),
        actors: aggregator::favorites(
            &actor_stats,
            thresholds.min_actor_count,
            thresholds.min_avg_rating,
        ),
    };

    let pool = recommender::candidates(&catalog, &merged);
    let candidates = recommender::score(&pool, &favorites, &config.scoring);
    let summary = summary::summarize(&merged, catalog.len(), catalog_missing_score);

    tracing::info!(
        catalog = catalog.len(),
        rated = summary.num_rated,
        matched = summary.num_matched,
        genres = genre_stats.len(),
        actors = actor_stats.len(),
        favorite_genres = favorites.genres.len(),
        favorite_actors = favorites.actors.len(),
        candidates = candidates.len(),
        "Insights computed"
    );

    Insights {
        catalog,
        merged,
        genre_stats,
        actor_stats,
        favorites,
        candidates,
        summary,
        computed_at: Utc::now(),
    }
}

/// Reads both datasets and returns their insights, reusing a cached result
/// when the input bytes are unchanged
pub fn load_insights(
    source: &dyn DatasetSource,
    cache: &SessionCache<Insights>,
    config: &PipelineConfig,
) -> AppResult<Arc<Insights>> {
    let catalog_bytes = source.read_catalog()?;
    let ratings_bytes = source.read_ratings()?;
    let key = CacheKey::for_inputs(&catalog_bytes, &ratings_bytes);

    cache.get_or_compute(key, || {
        tracing::info!(source = %source.describe(), "Building insights");
        build_insights(&catalog_bytes, &ratings_bytes, config)
    })
}
