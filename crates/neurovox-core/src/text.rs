//! Text normalization applied before synthesis.
//!
//! The rules run in a fixed order. Each rule is a single regex pass, so the
//! pipeline always terminates even when an expansion produces text that
//! another rule could match.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum number of characters handed to the acoustic model
pub const MAX_NORMALIZED_CHARS: usize = 2000;

/// Appended when the length cap finds no sentence boundary to cut back to
pub const ELLIPSIS: &str = "...";

static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[^\w\s.,!?;:'"()\-—–‘’“”]"#).expect("valid whitelist pattern")
});

static DOUBLE_QUOTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[“”]"#).expect("valid quote pattern"));

static SINGLE_QUOTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[‘’]").expect("valid quote pattern"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

static ABBREVIATIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\bDr\.", "Doctor"),
        (r"\bMr\.", "Mister"),
        (r"\bMrs\.", "Misses"),
        (r"\bMs\.", "Miss"),
        (r"\betc\.", "etcetera"),
        (r"\bvs\.", "versus"),
        (r"\be\.g\.", "for example"),
        (r"\bi\.e\.", "that is"),
    ]
    .into_iter()
    .map(|(pattern, expansion)| (Regex::new(pattern).expect("valid abbreviation pattern"), expansion))
    .collect()
});

// Order matters: the specific negations must run before the generic `n't`.
const CONTRACTIONS: &[(&str, &str)] = &[
    ("won't", "will not"),
    ("can't", "cannot"),
    ("n't", " not"),
    ("'re", " are"),
    ("'ve", " have"),
    ("'ll", " will"),
    ("'d", " would"),
];

/// Deterministic text cleanup for neural synthesis
#[derive(Debug, Clone, Copy)]
pub struct TextNormalizer {
    max_chars: usize,
}

impl TextNormalizer {
    /// Create a normalizer with the standard length cap
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_chars: MAX_NORMALIZED_CHARS,
        }
    }

    /// Create a normalizer with a custom length cap
    #[must_use]
    pub const fn with_max_chars(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Run the full normalization pipeline.
    ///
    /// An empty result is valid; callers decide whether it is acceptable.
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        let text = strip_disallowed(text);
        let text = straighten_quotes(&text);
        let text = expand_abbreviations(&text);
        let text = expand_contractions(&text);
        let text = collapse_whitespace(&text);
        cap_length(&text, self.max_chars)
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize with the default settings
#[must_use]
pub fn normalize(text: &str) -> String {
    TextNormalizer::new().normalize(text)
}

/// Drop every character outside the speakable whitelist
#[must_use]
pub fn strip_disallowed(text: &str) -> String {
    DISALLOWED.replace_all(text, "").into_owned()
}

/// Replace curly quotes with their straight equivalents
#[must_use]
pub fn straighten_quotes(text: &str) -> String {
    let text = DOUBLE_QUOTES.replace_all(text, "\"");
    SINGLE_QUOTES.replace_all(&text, "'").into_owned()
}

/// Expand the fixed abbreviation table
#[must_use]
pub fn expand_abbreviations(text: &str) -> String {
    ABBREVIATIONS
        .iter()
        .fold(text.to_string(), |acc, (pattern, expansion)| {
            pattern.replace_all(&acc, *expansion).into_owned()
        })
}

/// Expand the fixed contraction table
#[must_use]
pub fn expand_contractions(text: &str) -> String {
    CONTRACTIONS
        .iter()
        .fold(text.to_string(), |acc, (contraction, expansion)| {
            acc.replace(contraction, expansion)
        })
}

/// Collapse whitespace runs to a single space and trim both ends
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Enforce the character cap, preferring to end on a full sentence
#[must_use]
pub fn cap_length(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let head: String = text.chars().take(max_chars).collect();
    match head.rfind(&['.', '!', '?'][..]) {
        Some(boundary) => head[..=boundary].trim_end().to_string(),
        None => format!("{head}{ELLIPSIS}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_abbreviation_and_contraction_example() {
        assert!(normalize("Dr. Smith won't go").contains("Doctor Smith will not go"));
    }

    #[rstest]
    #[case("Mr. Jones", "Mister Jones")]
    #[case("Mrs. Jones", "Misses Jones")]
    #[case("Ms. Jones", "Miss Jones")]
    #[case("apples, pears, etc. are fruit", "apples, pears, etcetera are fruit")]
    #[case("cats vs. dogs", "cats versus dogs")]
    #[case("fruit, e.g. apples", "fruit, for example apples")]
    #[case("one thing, i.e. this", "one thing, that is this")]
    fn test_abbreviations(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_abbreviations_are_case_sensitive_and_anchored() {
        assert_eq!(normalize("dr. who"), "dr. who");
        assert_eq!(normalize("HeadDr. X"), "HeadDr. X");
    }

    #[rstest]
    #[case("I can't stop", "I cannot stop")]
    #[case("they don't know", "they do not know")]
    #[case("we're here", "we are here")]
    #[case("you've won", "you have won")]
    #[case("she'll see", "she will see")]
    #[case("he'd go", "he would go")]
    fn test_contractions(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_strips_symbols_and_keeps_punctuation() {
        assert_eq!(normalize("Price: $5 @ store #1!"), "Price: 5 store 1!");
        assert_eq!(normalize("(well) - yes; no: maybe?"), "(well) - yes; no: maybe?");
    }

    #[test]
    fn test_curly_quotes_become_straight() {
        assert_eq!(normalize("“Hello” ‘world’"), "\"Hello\" 'world'");
        assert_eq!(normalize("It’s fine"), "It's fine");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  a \t\n  b   c  "), "a b c");
    }

    #[test]
    fn test_empty_output_is_allowed() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("@@@ ###"), "");
    }

    #[test]
    fn test_cap_without_sentence_boundary_appends_ellipsis() {
        let input = "a".repeat(2100);
        let output = normalize(&input);
        assert_eq!(output.chars().count(), MAX_NORMALIZED_CHARS + ELLIPSIS.len());
        assert!(output.ends_with(ELLIPSIS));
        assert_eq!(&output[..MAX_NORMALIZED_CHARS], &input[..MAX_NORMALIZED_CHARS]);
    }

    #[test]
    fn test_cap_cuts_back_to_last_sentence() {
        let first = format!("{}.", "a".repeat(1500));
        let second = "b".repeat(600);
        let output = normalize(&format!("{first} {second}"));
        assert_eq!(output, first);
    }

    #[test]
    fn test_cap_keeps_question_and_exclamation_marks() {
        let first = format!("{}?", "a".repeat(1000));
        let second = format!("{}!", "b".repeat(500));
        let tail = "c".repeat(800);
        let output = normalize(&format!("{first} {second} {tail}"));
        assert_eq!(output, format!("{first} {second}"));
    }

    #[test]
    fn test_cap_counts_characters_not_bytes() {
        let input = "é".repeat(1999);
        assert_eq!(normalize(&input), input);
    }

    #[test]
    fn test_text_at_limit_is_untouched() {
        let input = "a".repeat(MAX_NORMALIZED_CHARS);
        assert_eq!(normalize(&input), input);
    }

    #[test]
    fn test_custom_cap() {
        let normalizer = TextNormalizer::with_max_chars(10);
        assert_eq!(normalizer.normalize("Hi. This is long"), "Hi.");
    }

    proptest! {
        #[test]
        fn prop_cleanup_rules_are_stable_on_output(input in "\\PC{0,300}") {
            let once = normalize(&input);
            let again = collapse_whitespace(&straighten_quotes(&strip_disallowed(&once)));
            prop_assert_eq!(once, again);
        }

        #[test]
        fn prop_repeated_runs_terminate_and_stay_bounded(input in "[a-zA-Z' .]{0,200}") {
            let mut text = input;
            for _ in 0..5 {
                text = normalize(&text);
                prop_assert!(text.chars().count() <= MAX_NORMALIZED_CHARS + ELLIPSIS.len());
            }
        }
    }
}
