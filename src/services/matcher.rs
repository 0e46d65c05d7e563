use std::collections::{BTreeSet, HashSet};
use std::iter;

use strsim::normalized_levenshtein;

/// Similarity required for a match when nothing else is configured
pub const DEFAULT_THRESHOLD: u8 = 80;

const TOKEN_SCALE: f64 = 0.95;
const PARTIAL_SCALE: f64 = 0.9;
const LONG_PARTIAL_SCALE: f64 = 0.6;

/// Slack for float noise when comparing a score against its ceiling
const EPSILON: f64 = 1e-9;

/// Weighted 0-100 similarity between two already-normalized titles
///
/// Only identical strings score 100. Plain edit-distance ratio for titles of
/// similar length, extended with token-order-insensitive comparisons, and
/// with best-window partial comparisons when one title is much longer than
/// the other ("great show" vs "great show season 2"). Token and partial
/// comparisons are discounted so an exact hit always wins.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 100.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let len_ratio = length_ratio(len_a, len_b);

    let base = ratio(a, b);

    if len_ratio < 1.5 {
        let token_score = token_sort_ratio(a, b).max(token_set_ratio(a, b)) * TOKEN_SCALE;
        return base.max(token_score);
    }

    let partial_scale = partial_scale(len_ratio);
    let partial = partial_ratio(a, b) * partial_scale;
    let token = token_set_ratio(a, b) * TOKEN_SCALE * partial_scale;

    base.max(partial).max(token)
}

fn length_ratio(len_a: usize, len_b: usize) -> f64 {
    len_a.max(len_b) as f64 / len_a.min(len_b) as f64
}

fn partial_scale(len_ratio: f64) -> f64 {
    if len_ratio < 8.0 {
        PARTIAL_SCALE
    } else {
        LONG_PARTIAL_SCALE
    }
}

fn ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b) * 100.0
}

fn sorted_tokens(s: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens
}

fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a).join(" "), &sorted_tokens(b).join(" "))
}

fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let common: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    let common = common.join(" ");
    let join = |rest: &[&str]| -> String {
        match (common.is_empty(), rest.is_empty()) {
            (true, _) => rest.join(" "),
            (false, true) => common.clone(),
            (false, false) => format!("{} {}", common, rest.join(" ")),
        }
    };
    let combined_a = join(&only_a);
    let combined_b = join(&only_b);

    let mut best = ratio(&combined_a, &combined_b);
    if !common.is_empty() {
        best = best
            .max(ratio(&common, &combined_a))
            .max(ratio(&common, &combined_b));
    }
    best
}

/// Best ratio of the shorter string against every equally long window of the longer one
fn partial_ratio(a: &str, b: &str) -> f64 {
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let window = shorter.chars().count();
    let bounds: Vec<usize> = longer
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(iter::once(longer.len()))
        .collect();

    let mut best: f64 = 0.0;
    for start in 0..bounds.len() - window {
        let candidate = &longer[bounds[start]..bounds[start + window]];
        best = best.max(ratio(shorter, candidate));
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// Sorted characters of a string, for multiset intersection counts
fn sorted_chars(s: &str) -> Vec<char> {
    let mut chars: Vec<char> = s.chars().collect();
    chars.sort_unstable();
    chars
}

/// Size of the multiset intersection of two sorted character lists
fn common_chars(a: &[char], b: &[char]) -> usize {
    let (mut i, mut j, mut common) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                common += 1;
                i += 1;
                j += 1;
            }
        }
    }
    common
}

/// Upper bound of [`ratio`] for strings of the given lengths sharing `common` characters
///
/// Every character of the longer string outside the shared multiset costs at
/// least one edit.
fn ratio_ceiling(common: usize, len_a: usize, len_b: usize) -> f64 {
    let longest = len_a.max(len_b);
    if longest == 0 {
        100.0
    } else {
        100.0 * common as f64 / longest as f64
    }
}

/// A normalized title with the data needed to bound its similarity cheaply
#[derive(Debug, Clone)]
struct IndexedTitle {
    text: String,
    chars: Vec<char>,
    sorted_token_chars: Vec<char>,
    tokens: BTreeSet<String>,
    token_set_chars: Vec<char>,
}

impl IndexedTitle {
    fn new(text: String) -> Self {
        let tokens: BTreeSet<String> = text.split_whitespace().map(str::to_string).collect();
        let token_set = tokens.iter().map(String::as_str).collect::<Vec<_>>().join(" ");

        Self {
            chars: sorted_chars(&text),
            sorted_token_chars: sorted_chars(&sorted_tokens(&text).join(" ")),
            token_set_chars: sorted_chars(&token_set),
            tokens,
            text,
        }
    }

    /// Value that [`similarity`] between the two titles can never exceed
    fn ceiling(&self, other: &IndexedTitle) -> f64 {
        if self.text == other.text {
            return 100.0;
        }
        if self.text.is_empty() || other.text.is_empty() {
            return 0.0;
        }

        let (len_a, len_b) = (self.chars.len(), other.chars.len());
        let common = common_chars(&self.chars, &other.chars);
        let base = ratio_ceiling(common, len_a, len_b);

        let token_set = if self.tokens.is_disjoint(&other.tokens) {
            ratio_ceiling(
                common_chars(&self.token_set_chars, &other.token_set_chars),
                self.token_set_chars.len(),
                other.token_set_chars.len(),
            )
        } else {
            100.0
        };

        let len_ratio = length_ratio(len_a, len_b);
        if len_ratio < 1.5 {
            let token_sort = ratio_ceiling(
                common_chars(&self.sorted_token_chars, &other.sorted_token_chars),
                self.sorted_token_chars.len(),
                other.sorted_token_chars.len(),
            );
            return base.max(token_sort.max(token_set) * TOKEN_SCALE);
        }

        // each window shares at most `common` characters with the shorter title
        let scale = partial_scale(len_ratio);
        let partial = 100.0 * common as f64 / len_a.min(len_b) as f64 * scale;
        base.max(partial).max(token_set * TOKEN_SCALE * scale)
    }
}

/// A match decision for one query
#[derive(Debug, Clone, PartialEq)]
pub struct TitleMatch {
    pub title: String,
    pub score: f64,
}

/// Fuzzy matcher over a fixed pool of normalized titles
///
/// The pool is deduplicated and kept in lexicographic order; when several
/// candidates share the best score the lexicographically first one wins, so
/// the result never depends on the order titles were loaded in.
///
/// Each query first bounds its similarity to every candidate from character
/// and token counts. Candidates whose bound falls below the threshold are
/// skipped, and the rest are scored in descending bound order until no
/// remaining bound can beat the best score found.
#[derive(Debug, Clone)]
pub struct TitleMatcher {
    candidates: Vec<IndexedTitle>,
    exact: HashSet<String>,
    threshold: u8,
}

impl TitleMatcher {
    pub fn new<I, S>(candidates: I, threshold: u8) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pool: BTreeSet<String> = candidates
            .into_iter()
            .map(Into::into)
            .filter(|c: &String| !c.is_empty())
            .collect();
        let exact = pool.iter().cloned().collect();

        Self {
            candidates: pool.into_iter().map(IndexedTitle::new).collect(),
            exact,
            threshold,
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Number of distinct candidate titles
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Highest scoring candidate, regardless of threshold
    pub fn best(&self, query: &str) -> Option<TitleMatch> {
        self.search(query, 0.0)
    }

    /// Best candidate if it reaches the threshold
    pub fn find(&self, query: &str) -> Option<TitleMatch> {
        let threshold = f64::from(self.threshold);
        match self.search(query, threshold) {
            Some(best) if best.score >= threshold => {
                tracing::debug!(query = %query, matched = %best.title, score = best.score, "Title matched");
                Some(best)
            }
            _ => {
                tracing::debug!(query = %query, threshold = self.threshold, "No title above threshold");
                None
            }
        }
    }

    /// Highest scoring candidate among those whose bound reaches `floor`
    fn search(&self, query: &str, floor: f64) -> Option<TitleMatch> {
        if query.is_empty() {
            return None;
        }

        if self.exact.contains(query) {
            return Some(TitleMatch {
                title: query.to_string(),
                score: 100.0,
            });
        }

        let target = IndexedTitle::new(query.to_string());
        let mut bounded: Vec<(f64, &IndexedTitle)> = self
            .candidates
            .iter()
            .map(|candidate| (target.ceiling(candidate), candidate))
            .filter(|(ceiling, _)| ceiling + EPSILON >= floor)
            .collect();
        // stable, so equal bounds stay in lexicographic order
        bounded.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut best: Option<TitleMatch> = None;
        for (ceiling, candidate) in bounded {
            if best.as_ref().is_some_and(|b| ceiling + EPSILON < b.score) {
                break;
            }

            let score = similarity(query, &candidate.text);
            let better = best.as_ref().map_or(true, |b| {
                score > b.score || (score == b.score && candidate.text < b.title)
            });
            if better {
                best = Some(TitleMatch {
                    title: candidate.text.clone(),
                    score,
                });
            }
        }
        best
    }
}

/// One-shot form of [`TitleMatcher::find`] returning only the matched title
pub fn match_title(query: &str, candidates: &[String], threshold: u8) -> Option<String> {
    TitleMatcher::new(candidates.iter().cloned(), threshold)
        .find(query)
        .map(|m| m.title)
}
