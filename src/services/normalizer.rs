const LEADING_ARTICLES: [&str; 3] = ["a ", "an ", "the "];

/// Canonical join key for a title
///
/// Lowercases, drops every character that is neither alphanumeric nor
/// whitespace, collapses whitespace runs, then strips leading "a"/"an"/"the".
/// Articles are stripped until none is left so the function is idempotent.
///
/// Catalog titles and hand-typed ratings titles ("The Great Show!" vs
/// "great show") are joined on this key.
pub fn normalize_title(title: &str) -> String {
    let mut normalized = collapse_whitespace(&strip_punctuation(&title.to_lowercase()));

    while let Some(rest) = LEADING_ARTICLES
        .iter()
        .find_map(|article| normalized.strip_prefix(article))
    {
        normalized = rest.to_string();
    }

    normalized
}

/// Same as [`normalize_title`] without the article stripping
///
/// Used for matching poster file names, where `The King.jpg` and `King.jpg`
/// are different posters.
pub fn normalize_loose(text: &str) -> String {
    collapse_whitespace(&strip_punctuation(&text.to_lowercase()))
}

/// Splits a comma separated field into trimmed, non-empty, distinct tokens
///
/// Order of first appearance is kept. `""`, `","` and whitespace-only fields
/// yield no tokens.
pub fn split_categories(field: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in field.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tokens.iter().any(|existing| existing == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// Repairs the UTF-8-read-as-MacRoman quote sequences found in the catalog export
///
/// A literal `\s` is a lost apostrophe before an `s`, so it becomes `'s`
/// and the `s` is kept.
pub fn fix_encoding(text: &str) -> String {
    text.replace("‚Äú", "\"")
        .replace("‚Äù", "\"")
        .replace("‚Äô", "'")
        .replace("\\s", "'s")
}

fn strip_punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title_basic() {
        assert_eq!(normalize_title("The Great Show!"), "great show");
        assert_eq!(normalize_title("the great show!"), "great show");
        assert_eq!(normalize_title("Great Show"), "great show");
    }

    #[test]
    fn test_normalize_title_articles() {
        assert_eq!(normalize_title("A Business Proposal"), "business proposal");
        assert_eq!(normalize_title("An Empress's Dignity"), "empresss dignity");
        // Only whole leading words count as articles
        assert_eq!(normalize_title("Theater Kid"), "theater kid");
        assert_eq!(normalize_title("Another Miss Oh"), "another miss oh");
        // A bare article is a title on its own
        assert_eq!(normalize_title("The"), "the");
    }

    #[test]
    fn test_normalize_title_whitespace_and_punctuation() {
        assert_eq!(normalize_title("  Crash   Landing\ton\nYou  "), "crash landing on you");
        assert_eq!(normalize_title("Reply 1988"), "reply 1988");
        assert_eq!(normalize_title("Mr. Sunshine"), "mr sunshine");
        assert_eq!(normalize_title("Hotel del Luna (2019)"), "hotel del luna 2019");
    }

    #[test]
    fn test_normalize_title_empty() {
        assert_eq!(normalize_title(""), "");
        assert_eq!(normalize_title("   "), "");
        assert_eq!(normalize_title("!!!"), "");
    }

    #[test]
    fn test_normalize_title_is_idempotent() {
        let titles = [
            "The Great Show!",
            "the the show",
            "The. Show",
            "A an the Glory",
            "  Vincenzo ",
            "It's Okay to Not Be Okay",
            "Kingdom: Ashin of the North",
            "Goblin (Guardian: The Lonely and Great God)",
            "",
            "The",
            "ÉCOLE Élite",
        ];
        for title in titles {
            let once = normalize_title(title);
            assert_eq!(normalize_title(&once), once, "not idempotent for {:?}", title);
        }
    }

    #[test]
    fn test_normalize_loose_keeps_articles() {
        assert_eq!(normalize_loose("The Great_Show"), "the greatshow");
        assert_eq!(normalize_loose("The  Great Show!"), "the great show");
    }

    #[test]
    fn test_split_categories() {
        assert_eq!(
            split_categories("Romance, Comedy ,Drama"),
            vec!["Romance", "Comedy", "Drama"]
        );
        assert_eq!(split_categories("Action,,  ,Thriller"), vec!["Action", "Thriller"]);
    }

    #[test]
    fn test_split_categories_empty_fields() {
        assert!(split_categories("").is_empty());
        assert!(split_categories(",").is_empty());
        assert!(split_categories(" , ,").is_empty());
        assert!(split_categories("   ").is_empty());
    }

    #[test]
    fn test_split_categories_deduplicates() {
        assert_eq!(split_categories("Drama, Drama, Comedy"), vec!["Drama", "Comedy"]);
    }

    #[test]
    fn test_fix_encoding() {
        assert_eq!(fix_encoding("‚ÄúHello‚Äù"), "\"Hello\"");
        assert_eq!(fix_encoding("It‚Äôs"), "It's");
        assert_eq!(fix_encoding("Queen\\s Umbrella"), "Queen's Umbrella");
        assert_eq!(fix_encoding("plain"), "plain");
    }

    #[test]
    fn test_fix_encoding_backslash_s_keeps_the_s() {
        assert_eq!(fix_encoding("Devil\\s Judge"), "Devil's Judge");
        assert_eq!(fix_encoding("\\s"), "'s");
        assert_eq!(fix_encoding("\\t"), "\\t");
    }
}
