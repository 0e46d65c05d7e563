use std::collections::HashMap;

use crate::{
    models::{CatalogItem, MergedRecord, UserRating},
    services::matcher::TitleMatcher,
};

/// Left-joins user ratings onto the catalog through fuzzy-matched title keys
///
/// Output has exactly one record per rating, in input order. When several
/// catalog rows share a normalized title, the first one in catalog order is
/// the join target.
pub fn merge(ratings: &[UserRating], catalog: &[CatalogItem], threshold: u8) -> Vec<MergedRecord> {
    let mut by_title: HashMap<&str, &CatalogItem> = HashMap::new();
    for item in catalog {
        by_title.entry(item.title_clean.as_str()).or_insert(item);
    }

    let matcher = TitleMatcher::new(by_title.keys().map(|k| k.to_string()), threshold);

    let merged: Vec<MergedRecord> = ratings
        .iter()
        .map(|rating| {
            let matched_key = matcher.find(&rating.title_clean).map(|m| m.title);
            let catalog_item = matched_key
                .as_deref()
                .and_then(|key| by_title.get(key))
                .map(|item| (*item).clone());

            MergedRecord {
                me: UserRating {
                    title_clean_matched: matched_key,
                    ..rating.clone()
                },
                catalog: catalog_item,
            }
        })
        .collect();

    let matched = merged.iter().filter(|r| r.is_matched()).count();
    tracing::info!(
        ratings = ratings.len(),
        catalog = catalog.len(),
        distinct_titles = matcher.len(),
        matched,
        unmatched = merged.len() - matched,
        threshold,
        "Merged ratings with catalog"
    );

    merged
}

/// Splits merged records into (matched, unmatched) by presence of a global score
pub fn partition(merged: &[MergedRecord]) -> (Vec<&MergedRecord>, Vec<&MergedRecord>) {
    merged.iter().partition(|r| r.is_matched())
}
