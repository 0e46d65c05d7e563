use serde::Serialize;

use crate::models::{CategoryField, MergedRecord};

/// One (record, category) pair of a multi-valued field
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExplodedRow<'a> {
    pub category: &'a str,
    pub title: &'a str,
    pub rating: Option<f64>,
    pub global_score: Option<f64>,
}

/// Expands each record into one row per token of the given category field
///
/// Records without a catalog side, or whose field is empty or only
/// separators, produce no rows at all.
pub fn explode<'a, I>(records: I, field: CategoryField) -> Vec<ExplodedRow<'a>>
where
    I: IntoIterator<Item = &'a MergedRecord>,
{
    let rows: Vec<ExplodedRow<'a>> = records
        .into_iter()
        .filter_map(|record| record.catalog.as_ref().map(|item| (record, item)))
        .flat_map(|(record, item)| {
            field.tokens(item).iter().map(move |token| ExplodedRow {
                category: token.as_str(),
                title: record.me.title.as_str(),
                rating: record.me.rating,
                global_score: item.global_score,
            })
        })
        .collect();

    tracing::debug!(field = field.as_str(), rows = rows.len(), "Exploded category field");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogItem, CatalogRow, RatingRow, UserRating};

    fn record(title: &str, genre: &str, cast: &str) -> MergedRecord {
        MergedRecord {
            me: UserRating::from(RatingRow {
                title: title.to_string(),
                rating: Some(9.0),
            }),
            catalog: Some(CatalogItem::from(CatalogRow {
                title: title.to_string(),
                genre: Some(genre.to_string()),
                cast: Some(cast.to_string()),
                global_score: Some(8.0),
                ..CatalogRow::default()
            })),
        }
    }

    #[test]
    fn test_explode_genres() {
        let records = vec![record("One", "Romance, Comedy", "Actor A")];
        let rows = explode(&records, CategoryField::Genre);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, "Romance");
        assert_eq!(rows[1].category, "Comedy");
        assert!(rows.iter().all(|r| r.title == "One" && r.rating == Some(9.0)));
        assert!(rows.iter().all(|r| r.global_score == Some(8.0)));
    }

    #[test]
    fn test_explode_cast_uses_same_rules() {
        let records = vec![record("One", "Drama", " Actor A ,Actor B, ")];
        let rows = explode(&records, CategoryField::Cast);
        let categories: Vec<&str> = rows.iter().map(|r| r.category).collect();
        assert_eq!(categories, vec!["Actor A", "Actor B"]);
    }

    #[test]
    fn test_explode_empty_fields_yield_no_rows() {
        let records = vec![record("Empty", "", ""), record("Comma", ",", " , ")];
        assert!(explode(&records, CategoryField::Genre).is_empty());
        assert!(explode(&records, CategoryField::Cast).is_empty());
    }

    #[test]
    fn test_explode_skips_records_without_catalog_side() {
        let mut unmatched = record("Lost", "Drama", "Actor A");
        unmatched.catalog = None;
        let records = vec![unmatched, record("Found", "Drama", "Actor A")];

        let rows = explode(&records, CategoryField::Genre);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Found");
    }
}
