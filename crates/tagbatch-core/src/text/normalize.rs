//! Idempotent string transforms applied to interrogation text.
//!
//! Every transform treats its input as a comma-delimited prompt: segments are
//! split on `,`, trimmed and rejoined with `", "`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::emoticons::{PUNCTUATION_SAFE, UNDERSCORE_SAFE};

static WEIGHT_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":\d+(\.\d+)?").expect("WEIGHT_SUFFIX_RE must compile"));

static PUNCTUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s,]").expect("PUNCTUATION_RE must compile"));

// Escaped parens are shielded with private-use code points while bare parens
// are removed. Neither can appear in tagger output.
const LEFT_PAREN_SHIELD: &str = "\u{E000}";
const RIGHT_PAREN_SHIELD: &str = "\u{E001}";

/// Emoticons sorted longest-first so `:-))` is claimed before `:-)`.
static PROTECTED_EMOTICONS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut list: Vec<&'static str> = PUNCTUATION_SAFE.to_vec();
    list.sort_by(|a, b| b.len().cmp(&a.len()));
    list
});

/// Split a prompt on commas into trimmed, non-empty segments.
pub fn split_segments(text: &str) -> Vec<&str> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Remove duplicate comma-separated segments, keeping the first occurrence.
///
/// Comparison is case-sensitive. Empty segments are dropped and the survivors
/// are rejoined with `", "`, so `dedup_comma_list(dedup_comma_list(x))` equals
/// `dedup_comma_list(x)`.
pub fn dedup_comma_list(text: &str) -> String {
    let mut seen = HashSet::new();
    split_segments(text)
        .into_iter()
        .filter(|segment| seen.insert(*segment))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Strip attention syntax from a single prompt segment.
///
/// Removes `:<number>` weight suffixes and bare parentheses. Escaped
/// parentheses (`\(`, `\)`) are literal text and survive.
///
/// ```
/// use tagbatch_core::text::strip_attention_syntax;
///
/// assert_eq!(strip_attention_syntax("(cat:1.2)"), "cat");
/// assert_eq!(strip_attention_syntax(r"\(smile\)"), r"\(smile\)");
/// ```
pub fn strip_attention_syntax(segment: &str) -> String {
    let without_weights = WEIGHT_SUFFIX_RE.replace_all(segment, "");
    without_weights
        .replace("\\(", LEFT_PAREN_SHIELD)
        .replace("\\)", RIGHT_PAREN_SHIELD)
        .replace(['(', ')'], "")
        .replace(LEFT_PAREN_SHIELD, "\\(")
        .replace(RIGHT_PAREN_SHIELD, "\\)")
        .trim()
        .to_string()
}

fn emoticon_placeholder(index: usize) -> String {
    // Word characters only, so the punctuation pass leaves it alone. The
    // trailing `ZZ` stops `ZZEMOTE1ZZ` from being a prefix of `ZZEMOTE10ZZ`.
    format!("ZZEMOTE{index}ZZ")
}

/// Remove punctuation except commas, keeping known text emoticons intact.
///
/// Segments left empty by the stripping are dropped. Characters outside `\w`
/// (including most symbols and emoji) are removed.
pub fn strip_punctuation_preserving_emoticons(text: &str) -> String {
    let mut protected = text.to_string();
    for (i, emoticon) in PROTECTED_EMOTICONS.iter().enumerate() {
        if protected.contains(emoticon) {
            protected = protected.replace(emoticon, &emoticon_placeholder(i));
        }
    }

    let stripped = PUNCTUATION_RE.replace_all(&protected, "");
    let mut rejoined = split_segments(&stripped).join(", ");

    for (i, emoticon) in PROTECTED_EMOTICONS.iter().enumerate() {
        let placeholder = emoticon_placeholder(i);
        if rejoined.contains(&placeholder) {
            rejoined = rejoined.replace(&placeholder, emoticon);
        }
    }
    rejoined
}

/// Replace underscores with spaces unless the tag is an underscore emoticon.
pub fn normalize_underscore(tag: &str) -> String {
    if UNDERSCORE_SAFE.contains(&tag) {
        tag.to_string()
    } else {
        tag.replace('_', " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        assert_eq!(
            dedup_comma_list("cat, dog,cat ,  bird, dog"),
            "cat, dog, bird"
        );
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        assert_eq!(dedup_comma_list("Cat, cat"), "Cat, cat");
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let inputs = [
            "",
            ",,,",
            "a, b, a, , c, ",
            " solo ,solo, (x:1.2), (x:1.2)",
            "1girl, smile, 1girl, long hair, smile, ",
        ];
        for input in inputs {
            let once = dedup_comma_list(input);
            assert_eq!(dedup_comma_list(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_dedup_empty_inputs() {
        assert_eq!(dedup_comma_list(""), "");
        assert_eq!(dedup_comma_list(", , ,"), "");
    }

    #[test]
    fn test_strip_attention_weight_and_parens() {
        assert_eq!(strip_attention_syntax("(cat:1.2)"), "cat");
        assert_eq!(strip_attention_syntax("((masterpiece))"), "masterpiece");
        assert_eq!(strip_attention_syntax(" dog:2 "), "dog");
        assert_eq!(strip_attention_syntax("plain"), "plain");
    }

    #[test]
    fn test_strip_attention_preserves_escaped_parens() {
        assert_eq!(strip_attention_syntax(r"\(smile\)"), r"\(smile\)");
        assert_eq!(
            strip_attention_syntax(r"(hatsune miku \(cosplay\):1.1)"),
            r"hatsune miku \(cosplay\)"
        );
    }

    #[test]
    fn test_strip_punctuation_basic() {
        assert_eq!(
            strip_punctuation_preserving_emoticons("a cat!, a dog?, ..."),
            "a cat, a dog, ..."
        );
        assert_eq!(strip_punctuation_preserving_emoticons("hello; world"), "hello world");
    }

    #[test]
    fn test_strip_punctuation_keeps_emoticons() {
        assert_eq!(
            strip_punctuation_preserving_emoticons("happy :), wink ;), >_<!"),
            "happy :), wink ;), >_<"
        );
        assert_eq!(strip_punctuation_preserving_emoticons("cat's toy"), "cat's toy");
    }

    #[test]
    fn test_strip_punctuation_prefers_longest_emoticon() {
        assert_eq!(strip_punctuation_preserving_emoticons("very happy :-))"), "very happy :-))");
    }

    #[test]
    fn test_strip_punctuation_drops_emptied_segments() {
        assert_eq!(strip_punctuation_preserving_emoticons("cat, !!!, dog"), "cat, dog");
        assert_eq!(strip_punctuation_preserving_emoticons(""), "");
        assert_eq!(strip_punctuation_preserving_emoticons(",,"), "");
    }

    #[test]
    fn test_strip_punctuation_many_emoticons_restore_exactly() {
        // Enough distinct emoticons that multi-digit placeholders are in play.
        let input = ":), ;), :D, :P, :O, o_o, x_x, <3, o7, v.v, ._., >_<";
        assert_eq!(strip_punctuation_preserving_emoticons(input), input);
    }

    #[test]
    fn test_strip_punctuation_is_lossy_for_symbols() {
        assert_eq!(strip_punctuation_preserving_emoticons("star ★"), "star");
    }

    #[test]
    fn test_normalize_underscore() {
        assert_eq!(normalize_underscore("long_hair"), "long hair");
        assert_eq!(normalize_underscore("^_^"), "^_^");
        assert_eq!(normalize_underscore("o_o"), "o_o");
        assert_eq!(normalize_underscore("looking_at_viewer"), "looking at viewer");
        assert_eq!(normalize_underscore("plain"), "plain");
    }

    #[test]
    fn test_split_segments() {
        assert_eq!(split_segments(" a ,, b ,"), vec!["a", "b"]);
        assert!(split_segments("").is_empty());
    }
}
