use std::cmp::Ordering;
use std::collections::HashSet;

use crate::{
    config::ScoringConfig,
    models::{Candidate, CatalogItem, Favorites, MergedRecord},
    services::aggregator::desc_missing_last,
};

/// Separator used when reasons are joined into one line
pub const REASON_SEPARATOR: &str = " • ";

const MAX_NAMED_MATCHES: usize = 2;
const FALLBACK_REASON: &str = "Recommended based on overall similarity to your taste profile";

/// Catalog items the user has not rated
///
/// An item is excluded when its normalized title is the match key of any
/// user rating, even if that rating is otherwise unmatched because the
/// catalog row lacks a global score.
pub fn candidates<'a>(catalog: &'a [CatalogItem], merged: &[MergedRecord]) -> Vec<&'a CatalogItem> {
    let watched: HashSet<&str> = merged
        .iter()
        .filter_map(|r| r.me.title_clean_matched.as_deref())
        .collect();

    catalog
        .iter()
        .filter(|item| !watched.contains(item.title_clean.as_str()))
        .collect()
}

/// Linear recommendation score
///
/// Non-decreasing in each of its three inputs for non-negative weights.
pub fn reco_score(
    global_score_norm: f64,
    genre_overlap: usize,
    actor_overlap: usize,
    config: &ScoringConfig,
) -> f64 {
    config.weight_global * global_score_norm
        + config.weight_genre * genre_overlap as f64
        + config.weight_actor * actor_overlap as f64
}

/// Scores and ranks candidates against the user's favorites
///
/// A missing global score contributes nothing to `reco_score`. Ranking is by
/// score, then global score (missing last), then title.
pub fn score(
    candidates: &[&CatalogItem],
    favorites: &Favorites,
    config: &ScoringConfig,
) -> Vec<Candidate> {
    let fav_genres: HashSet<&str> = favorites.genres.iter().map(String::as_str).collect();
    let fav_actors: HashSet<&str> = favorites.actors.iter().map(String::as_str).collect();

    let mut scored: Vec<Candidate> = candidates
        .iter()
        .map(|item| {
            let matched_genres = overlapping(&item.genres, &fav_genres);
            let matched_actors = overlapping(&item.actors, &fav_actors);

            let global_score_norm = item
                .global_score
                .filter(|s| s.is_finite())
                .map(|s| s / config.global_score_scale);
            let reco_score = reco_score(
                global_score_norm.unwrap_or(0.0),
                matched_genres.len(),
                matched_actors.len(),
                config,
            );

            let reasons = explain(&matched_genres, &matched_actors, item.global_score, config);

            Candidate {
                item: (*item).clone(),
                genre_overlap: matched_genres.len(),
                actor_overlap: matched_actors.len(),
                global_score_norm,
                reco_score,
                why_recommended: reasons.join(REASON_SEPARATOR),
                reasons,
            }
        })
        .collect();

    scored.sort_by(rank_order);
    scored
}

fn rank_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.reco_score
        .partial_cmp(&a.reco_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| desc_missing_last(a.item.global_score, b.item.global_score))
        .then_with(|| a.item.title.cmp(&b.item.title))
}

fn overlapping<'a>(values: &'a [String], favorites: &HashSet<&str>) -> Vec<&'a str> {
    values
        .iter()
        .map(String::as_str)
        .filter(|v| favorites.contains(v))
        .collect()
}

/// Human readable reasons for a recommendation
///
/// Rules are checked in priority order (favorite genres, favorite actors,
/// strong global score) and the first `max_reasons` that apply are kept. Never
/// empty: a generic reason is returned when no rule applies.
pub fn explain(
    matched_genres: &[&str],
    matched_actors: &[&str],
    global_score: Option<f64>,
    config: &ScoringConfig,
) -> Vec<String> {
    let named = |names: &[&str]| {
        names
            .iter()
            .take(MAX_NAMED_MATCHES)
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    };
    let strong_score = global_score.filter(|s| s.is_finite() && *s >= config.strong_global_score);

    let rules = [
        (!matched_genres.is_empty())
            .then(|| format!("Matches your favorite genres: {}", named(matched_genres))),
        (!matched_actors.is_empty())
            .then(|| format!("Features actors you rate highly: {}", named(matched_actors))),
        strong_score.map(|s| format!("Strong global rating ({:.1})", s)),
    ];

    let mut reasons: Vec<String> = rules
        .into_iter()
        .flatten()
        .take(config.max_reasons.max(1))
        .collect();

    if reasons.is_empty() {
        reasons.push(FALLBACK_REASON.to_string());
    }
    reasons
}
