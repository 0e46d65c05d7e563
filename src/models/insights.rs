use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CatalogItem, MergedRecord};

/// Aggregate of the user's matched ratings for one genre or actor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryStat {
    pub category: String,
    /// Mean personal rating; ratings that failed to parse are left out
    pub my_avg_rating: Option<f64>,
    pub global_avg_score: Option<f64>,
    /// Matched records listing this category
    pub count: usize,
}

/// A catalog item the user has not rated, scored for recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub genre_overlap: usize,
    pub actor_overlap: usize,
    /// Global score divided by the score scale; `None` when the catalog has no score
    pub global_score_norm: Option<f64>,
    pub reco_score: f64,
    pub reasons: Vec<String>,
    pub why_recommended: String,
}

/// Favorite genres and actors, in display order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Favorites {
    pub genres: Vec<String>,
    pub actors: Vec<String>,
}

/// Headline numbers for the overview cards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryStats {
    pub catalog_size: usize,
    /// Catalog rows whose global score was missing or unparseable
    pub catalog_missing_score: usize,
    pub num_rated: usize,
    pub num_matched: usize,
    pub num_unmatched: usize,
    pub my_mean_all: Option<f64>,
    pub my_mean_matched: Option<f64>,
    pub global_mean: Option<f64>,
    /// Mean of (personal rating - global score) over matched records
    pub mean_diff: Option<f64>,
}

/// Everything derived from one snapshot of the two input datasets
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Insights {
    pub catalog: Vec<CatalogItem>,
    pub merged: Vec<MergedRecord>,
    pub genre_stats: Vec<CategoryStat>,
    pub actor_stats: Vec<CategoryStat>,
    pub favorites: Favorites,
    /// Ranked best first
    pub candidates: Vec<Candidate>,
    pub summary: SummaryStats,
    pub computed_at: DateTime<Utc>,
}

impl Insights {
    pub fn matched(&self) -> impl Iterator<Item = &MergedRecord> {
        self.merged.iter().filter(|r| r.is_matched())
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &MergedRecord> {
        self.merged.iter().filter(|r| !r.is_matched())
    }

    /// Top `limit` candidates
    pub fn top_candidates(&self, limit: usize) -> &[Candidate] {
        &self.candidates[..limit.min(self.candidates.len())]
    }
}
