use std::cmp::Ordering;
use std::collections::HashMap;

use crate::{models::CategoryStat, services::exploder::ExplodedRow};

/// Running mean that ignores missing values
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Mean {
    sum: f64,
    n: usize,
}

impl Mean {
    pub(crate) fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            self.sum += v;
            self.n += 1;
        }
    }

    pub(crate) fn value(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

impl FromIterator<Option<f64>> for Mean {
    fn from_iter<I: IntoIterator<Item = Option<f64>>>(iter: I) -> Self {
        let mut mean = Mean::default();
        for value in iter {
            mean.push(value);
        }
        mean
    }
}

#[derive(Default)]
struct Group {
    rating: Mean,
    global: Mean,
    count: usize,
}

/// Groups exploded rows by category
///
/// Result is in display order: count descending, then mean personal rating
/// descending (missing last), then category name.
pub fn aggregate(rows: &[ExplodedRow<'_>]) -> Vec<CategoryStat> {
    let mut groups: HashMap<&str, Group> = HashMap::new();
    for row in rows {
        let group = groups.entry(row.category).or_default();
        group.rating.push(row.rating);
        group.global.push(row.global_score);
        group.count += 1;
    }

    let mut stats: Vec<CategoryStat> = groups
        .into_iter()
        .map(|(category, group)| CategoryStat {
            category: category.to_string(),
            my_avg_rating: group.rating.value(),
            global_avg_score: group.global.value(),
            count: group.count,
        })
        .collect();

    stats.sort_by(display_order);
    stats
}

fn display_order(a: &CategoryStat, b: &CategoryStat) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| desc_missing_last(a.my_avg_rating, b.my_avg_rating))
        .then_with(|| a.category.cmp(&b.category))
}

/// Descending order over optional floats with `None` sorted after every value
pub(crate) fn desc_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Names of categories with at least `min_count` records and a mean personal
/// rating of at least `min_avg_rating`, in the order of `stats`
pub fn favorites(stats: &[CategoryStat], min_count: usize, min_avg_rating: f64) -> Vec<String> {
    stats
        .iter()
        .filter(|s| s.count >= min_count)
        .filter(|s| s.my_avg_rating.is_some_and(|avg| avg >= min_avg_rating))
        .map(|s| s.category.clone())
        .collect()
}
