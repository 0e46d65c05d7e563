use crate::{
    models::{MergedRecord, SummaryStats},
    services::aggregator::Mean,
};

/// Overview numbers over the merged ratings
///
/// Missing values are left out of every mean rather than counted as zero.
pub fn summarize(
    merged: &[MergedRecord],
    catalog_size: usize,
    catalog_missing_score: usize,
) -> SummaryStats {
    let matched: Vec<&MergedRecord> = merged.iter().filter(|r| r.is_matched()).collect();

    let my_mean_all: Mean = merged.iter().map(|r| r.rating()).collect();
    let my_mean_matched: Mean = matched.iter().map(|r| r.rating()).collect();
    let global_mean: Mean = matched.iter().map(|r| r.global_score()).collect();
    let mean_diff: Mean = matched
        .iter()
        .map(|r| Some(r.rating()? - r.global_score()?))
        .collect();

    SummaryStats {
        catalog_size,
        catalog_missing_score,
        num_rated: merged.len(),
        num_matched: matched.len(),
        num_unmatched: merged.len() - matched.len(),
        my_mean_all: my_mean_all.value(),
        my_mean_matched: my_mean_matched.value(),
        global_mean: global_mean.value(),
        mean_diff: mean_diff.value(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogItem, CatalogRow, RatingRow, UserRating};

    fn record(rating: Option<f64>, global: Option<f64>) -> MergedRecord {
        MergedRecord {
            me: UserRating::from(RatingRow {
                title: "t".to_string(),
                rating,
            }),
            catalog: global.map(|g| {
                CatalogItem::from(CatalogRow {
                    title: "t".to_string(),
                    global_score: Some(g),
                    ..CatalogRow::default()
                })
            }),
        }
    }

    #[test]
    fn test_summarize_counts_and_means() {
        let merged = vec![
            record(Some(9.0), Some(8.0)),
            record(Some(7.0), Some(9.0)),
            record(Some(5.0), None),
        ];

        let stats = summarize(&merged, 10, 1);
        assert_eq!(stats.catalog_size, 10);
        assert_eq!(stats.catalog_missing_score, 1);
        assert_eq!(stats.num_rated, 3);
        assert_eq!(stats.num_matched, 2);
        assert_eq!(stats.num_unmatched, 1);
        assert_eq!(stats.my_mean_all, Some(7.0));
        assert_eq!(stats.my_mean_matched, Some(8.0));
        assert_eq!(stats.global_mean, Some(8.5));
        assert_eq!(stats.mean_diff, Some(-0.5));
    }

    #[test]
    fn test_summarize_skips_missing_personal_ratings() {
        let merged = vec![record(None, Some(8.0)), record(Some(6.0), Some(7.0))];
        let stats = summarize(&merged, 2, 0);
        assert_eq!(stats.my_mean_all, Some(6.0));
        assert_eq!(stats.global_mean, Some(7.5));
        assert_eq!(stats.mean_diff, Some(-1.0));
    }

    #[test]
    fn test_summarize_empty() {
        let stats = summarize(&[], 5, 0);
        assert_eq!(stats.num_rated, 0);
        assert_eq!(stats.num_matched, 0);
        assert_eq!(stats.my_mean_all, None);
        assert_eq!(stats.mean_diff, None);
    }
}
