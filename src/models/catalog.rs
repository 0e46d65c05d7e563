use serde::{Deserialize, Serialize};

use crate::services::normalizer::{normalize_title, split_categories};

/// A catalog row after column remapping and value coercion
///
/// Numeric fields that failed to parse are already `None` here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRow {
    pub title: String,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub cast: Option<String>,
    pub synopsis: Option<String>,
    pub global_score: Option<f64>,
    pub content_rating: Option<String>,
    pub tags: Option<String>,
    pub network: Option<String>,
    pub img_url: Option<String>,
    pub episodes: Option<u32>,
}

/// A title from the curated catalog
///
/// The normalized title and the exploded genre/cast lists are derived once
/// when the item is built and never change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub title: String,
    pub title_clean: String,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub genres: Vec<String>,
    pub cast: Option<String>,
    pub actors: Vec<String>,
    pub synopsis: Option<String>,
    pub global_score: Option<f64>,
    pub content_rating: Option<String>,
    pub tags: Option<String>,
    pub network: Option<String>,
    pub img_url: Option<String>,
    pub episodes: Option<u32>,
}

impl From<CatalogRow> for CatalogItem {
    fn from(row: CatalogRow) -> Self {
        let genres = row.genre.as_deref().map(split_categories).unwrap_or_default();
        let actors = row.cast.as_deref().map(split_categories).unwrap_or_default();

        CatalogItem {
            title_clean: normalize_title(&row.title),
            title: row.title,
            year: row.year,
            genre: row.genre,
            genres,
            cast: row.cast,
            actors,
            synopsis: row.synopsis,
            global_score: row.global_score,
            content_rating: row.content_rating,
            tags: row.tags,
            network: row.network,
            img_url: row.img_url,
            episodes: row.episodes,
        }
    }
}

/// Multi-valued categorical fields of a catalog item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryField {
    Genre,
    Cast,
}

impl CategoryField {
    /// Tokens of this field for the given item
    pub fn tokens<'a>(&self, item: &'a CatalogItem) -> &'a [String] {
        match self {
            CategoryField::Genre => &item.genres,
            CategoryField::Cast => &item.actors,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryField::Genre => "genre",
            CategoryField::Cast => "cast",
        }
    }
}
