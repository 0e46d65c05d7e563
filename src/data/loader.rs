use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord, Trim};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogItem, CatalogRow, RatingRow, UserRating},
    services::normalizer::fix_encoding,
};

/// Canonical column name followed by the headers accepted for it
type ColumnAliases = (&'static str, &'static [&'static str]);

pub const CATALOG_COLUMNS: &[ColumnAliases] = &[
    ("title", &["title", "Name"]),
    ("year", &["year", "Year"]),
    ("genre", &["genre", "Genre"]),
    ("cast", &["cast", "Main Cast"]),
    ("synopsis", &["synopsis", "Sinopsis", "Synopsis"]),
    ("global_score", &["global_score", "Score"]),
    ("content_rating", &["content_rating", "Content Rating"]),
    ("tags", &["tags", "Tags"]),
    ("network", &["network", "Network"]),
    ("img_url", &["img_url", "img url"]),
    ("episodes", &["episodes", "Episode", "episode_raw"]),
];

pub const CATALOG_REQUIRED: &[&str] = &["title", "genre", "cast", "global_score"];

pub const RATINGS_COLUMNS: &[ColumnAliases] = &[
    ("title", &["title", "Title", "Name"]),
    ("rating", &["rating", "Rating", "My Rating", "my_rating"]),
];

pub const RATINGS_REQUIRED: &[&str] = &["title", "rating"];

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Header positions keyed by canonical column name
#[derive(Debug)]
struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
}

impl ColumnIndex {
    fn resolve(
        dataset: &str,
        headers: &StringRecord,
        columns: &[ColumnAliases],
        required: &[&str],
    ) -> AppResult<Self> {
        let mut positions = HashMap::new();
        for (canonical, aliases) in columns {
            let found = headers.iter().position(|header| {
                aliases
                    .iter()
                    .any(|alias| header.trim().eq_ignore_ascii_case(alias))
            });
            if let Some(idx) = found {
                positions.insert(*canonical, idx);
            }
        }

        if let Some(missing) = required.iter().find(|c| !positions.contains_key(*c)) {
            return Err(AppError::SchemaMismatch {
                dataset: dataset.to_string(),
                column: missing.to_string(),
            });
        }

        Ok(Self { positions })
    }

    /// Trimmed, non-empty value of a column
    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        self.positions
            .get(column)
            .and_then(|idx| record.get(*idx))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn text(&self, record: &StringRecord, column: &str) -> Option<String> {
        self.get(record, column).map(fix_encoding)
    }

    fn raw(&self, record: &StringRecord, column: &str) -> Option<String> {
        self.get(record, column).map(str::to_string)
    }
}

fn reader(bytes: &[u8]) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes)
}

/// Parses a finite real number
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a year, accepting "2019" as well as "2019.0"
pub fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    value.parse::<i32>().ok().or_else(|| {
        parse_number(value)
            .filter(|v| v.fract() == 0.0 && *v >= f64::from(i32::MIN) && *v <= f64::from(i32::MAX))
            .map(|v| v as i32)
    })
}

/// First run of digits in free text such as "16 episodes"
pub fn parse_episodes(value: &str) -> Option<u32> {
    DIGITS
        .find(value)
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// Applies `parse` to a present value, counting values that fail to parse
fn coerce<T>(raw: Option<&str>, parse: fn(&str) -> Option<T>, coerced: &mut usize) -> Option<T> {
    let raw = raw?;
    let parsed = parse(raw);
    if parsed.is_none() {
        *coerced += 1;
    }
    parsed
}

/// Parses the catalog dataset
///
/// Source headers are remapped to canonical column names through
/// [`CATALOG_COLUMNS`]. Numeric fields that fail to parse become `None`; only
/// a missing required column or a structurally broken file is an error.
pub fn parse_catalog(bytes: &[u8]) -> AppResult<Vec<CatalogItem>> {
    let mut rdr = reader(bytes);
    let columns = ColumnIndex::resolve("catalog", rdr.headers()?, CATALOG_COLUMNS, CATALOG_REQUIRED)?;

    let mut items = Vec::new();
    let mut coerced = 0usize;

    for record in rdr.records() {
        let record = record?;

        let row = CatalogRow {
            title: columns.text(&record, "title").unwrap_or_default(),
            year: coerce(columns.get(&record, "year"), parse_year, &mut coerced),
            genre: columns.text(&record, "genre"),
            cast: columns.text(&record, "cast"),
            synopsis: columns.text(&record, "synopsis"),
            global_score: coerce(columns.get(&record, "global_score"), parse_number, &mut coerced),
            content_rating: columns.raw(&record, "content_rating"),
            tags: columns.text(&record, "tags"),
            network: columns.raw(&record, "network"),
            img_url: columns.raw(&record, "img_url"),
            episodes: coerce(columns.get(&record, "episodes"), parse_episodes, &mut coerced),
        };
        items.push(CatalogItem::from(row));
    }

    if coerced > 0 {
        tracing::warn!(coerced, "Catalog values could not be parsed as numbers and were dropped");
    }
    tracing::info!(rows = items.len(), "Parsed catalog dataset");

    Ok(items)
}

/// Parses the personal ratings dataset, with the same header remapping and
/// numeric coercion as [`parse_catalog`]
pub fn parse_ratings(bytes: &[u8]) -> AppResult<Vec<UserRating>> {
    let mut rdr = reader(bytes);
    let columns = ColumnIndex::resolve("ratings", rdr.headers()?, RATINGS_COLUMNS, RATINGS_REQUIRED)?;

    let mut ratings = Vec::new();
    let mut coerced = 0usize;

    for record in rdr.records() {
        let record = record?;
        ratings.push(UserRating::from(RatingRow {
            title: columns.raw(&record, "title").unwrap_or_default(),
            rating: coerce(columns.get(&record, "rating"), parse_number, &mut coerced),
        }));
    }

    if coerced > 0 {
        tracing::warn!(coerced, "Personal ratings could not be parsed as numbers and were dropped");
    }
    tracing::info!(rows = ratings.len(), "Parsed ratings dataset");

    Ok(ratings)
}
