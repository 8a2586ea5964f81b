// 🧹 Text Normalizer
// One cleanup function shared by training and inference.

use regex::Regex;
use std::sync::OnceLock;

/// Currency marker stripped from every message (matched after lowercasing)
pub const CURRENCY_MARKER: &str = "inr";

static DIGITS_RE: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

fn digits_regex() -> &'static Regex {
    DIGITS_RE.get_or_init(|| {
        Regex::new(r"\d+").unwrap_or_else(|error| panic!("digit regex failed to compile: {error}"))
    })
}

fn whitespace_regex() -> &'static Regex {
    WHITESPACE_RE.get_or_init(|| {
        Regex::new(r"\s+")
            .unwrap_or_else(|error| panic!("whitespace regex failed to compile: {error}"))
    })
}

/// Normalize a raw transaction message.
///
/// Lowercases, removes the currency marker and every digit run, collapses
/// whitespace and trims. Marker and digit removal repeat until stable, so
/// `"in5r"` does not leave a fresh `"inr"` behind and the function is
/// idempotent.
pub fn normalize(text: &str) -> String {
    let mut current = text.to_lowercase();

    loop {
        let without_marker = current.replace(CURRENCY_MARKER, "");
        let stripped = digits_regex().replace_all(&without_marker, "").into_owned();
        if stripped == current {
            break;
        }
        current = stripped;
    }

    whitespace_regex().replace_all(&current, " ").trim().to_string()
}

/// Split normalized text into vocabulary tokens.
///
/// Tokens are maximal runs of alphanumerics and `_`; single characters are
/// dropped (`"domino's"` yields `["domino"]`).
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("INR 250 spent at Domino's", "spent at domino's")]
    #[case("Paid electricity bill INR 1200", "paid electricity bill")]
    #[case("  INR   50000 credited\tas salary \n", "credited as salary")]
    #[case("inr inr INR", "")]
    #[case("", "")]
    #[case("Refund of 1,500.00", "refund of ,.")]
    fn test_normalize_examples(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize(raw), expected);
    }

    #[test]
    fn test_marker_removed_inside_words() {
        // Substring removal, not word removal
        assert_eq!(normalize("Drinrks at Pub"), "drks at pub");
    }

    #[rstest]
    #[case("in5r")]
    #[case("iinrnr")]
    #[case("I9N8R7 spent")]
    #[case("a 5 b")]
    #[case("   ")]
    #[case("ÉCOLE ２０２４ fees")]
    #[case("INR 1200 paid for electricity bill (rented house)")]
    fn test_normalize_is_idempotent(#[case] raw: &str) {
        let once = normalize(raw);
        assert_eq!(normalize(&once), once);
    }

    #[rstest]
    #[case("INR 1200 paid")]
    #[case("in5r")]
    #[case("٣٤ arabic-indic digits")]
    #[case("fullwidth ２０２４")]
    fn test_normalize_removes_all_digits(#[case] raw: &str) {
        let normalized = normalize(raw);
        assert!(
            !normalized.chars().any(|c| c.is_ascii_digit()),
            "digits left in {normalized:?}"
        );
        assert!(!regex::Regex::new(r"\d").unwrap().is_match(&normalized));
    }

    #[test]
    fn test_marker_splice_is_removed() {
        assert_eq!(normalize("in5r"), "");
        assert_eq!(normalize("iinrnr"), "");
    }

    #[test]
    fn test_tokenize_drops_short_tokens() {
        assert_eq!(tokenize("spent at domino's"), vec!["spent", "at", "domino"]);
        assert_eq!(tokenize("a b c"), Vec::<&str>::new());
        assert_eq!(tokenize("tata cliq"), vec!["tata", "cliq"]);
        assert_eq!(tokenize("part-time job"), vec!["part", "time", "job"]);
        assert_eq!(tokenize("snake_case word"), vec!["snake_case", "word"]);
    }
}
