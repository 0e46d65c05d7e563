use serde::{Deserialize, Serialize};

use super::CatalogItem;
use crate::services::normalizer::normalize_title;

/// A personal rating row after column remapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingRow {
    pub title: String,
    pub rating: Option<f64>,
}

/// A title the user rated, as they wrote it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRating {
    pub title: String,
    pub title_clean: String,
    /// `None` when the value in the ratings file was missing or not a number
    pub rating: Option<f64>,
    /// Normalized catalog title this rating was fuzzy-matched to
    pub title_clean_matched: Option<String>,
}

impl From<RatingRow> for UserRating {
    fn from(row: RatingRow) -> Self {
        UserRating {
            title_clean: normalize_title(&row.title),
            title: row.title,
            rating: row.rating,
            title_clean_matched: None,
        }
    }
}

/// A user rating left-joined with the catalog item it matched
///
/// Rating-side and catalog-side fields live under separate `me` and
/// `catalog` namespaces, so a shared field name such as `title` never collides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergedRecord {
    pub me: UserRating,
    pub catalog: Option<CatalogItem>,
}

impl MergedRecord {
    /// A record is matched exactly when the catalog side carries a global score
    pub fn is_matched(&self) -> bool {
        self.global_score().is_some()
    }

    pub fn rating(&self) -> Option<f64> {
        self.me.rating
    }

    pub fn global_score(&self) -> Option<f64> {
        self.catalog.as_ref().and_then(|c| c.global_score)
    }

    /// Title to show to the user: their own spelling
    pub fn display_title(&self) -> &str {
        &self.me.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogRow;

    fn rating(title: &str, value: f64) -> UserRating {
        UserRating::from(RatingRow {
            title: title.to_string(),
            rating: Some(value),
        })
    }

    #[test]
    fn test_user_rating_from_row_normalizes() {
        let r = rating("the great show!", 9.0);
        assert_eq!(r.title, "the great show!");
        assert_eq!(r.title_clean, "great show");
        assert_eq!(r.title_clean_matched, None);
    }

    #[test]
    fn test_merged_record_matched_requires_score() {
        let with_score = CatalogItem::from(CatalogRow {
            title: "Great Show".to_string(),
            global_score: Some(8.1),
            ..CatalogRow::default()
        });
        let without_score = CatalogItem::from(CatalogRow {
            title: "Great Show".to_string(),
            ..CatalogRow::default()
        });

        let matched = MergedRecord {
            me: rating("great show", 9.0),
            catalog: Some(with_score),
        };
        let scoreless = MergedRecord {
            me: rating("great show", 9.0),
            catalog: Some(without_score),
        };
        let unmatched = MergedRecord {
            me: rating("great show", 9.0),
            catalog: None,
        };

        assert!(matched.is_matched());
        assert_eq!(matched.global_score(), Some(8.1));
        assert!(!scoreless.is_matched());
        assert!(!unmatched.is_matched());
        assert_eq!(unmatched.display_title(), "great show");
    }

    #[test]
    fn test_merged_record_serializes_namespaced_titles() {
        let record = MergedRecord {
            me: rating("my title", 7.5),
            catalog: Some(CatalogItem::from(CatalogRow {
                title: "Catalog Title".to_string(),
                ..CatalogRow::default()
            })),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["me"]["title"], "my title");
        assert_eq!(json["catalog"]["title"], "Catalog Title");
    }
}
