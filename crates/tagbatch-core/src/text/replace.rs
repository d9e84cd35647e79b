//! User-defined find/replace pairs applied to whole words.

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

/// Ordered old→new phrase pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacePairSet {
    pairs: Vec<(String, String)>,
}

impl ReplacePairSet {
    /// Build pairs from two parallel comma-separated lists.
    ///
    /// The longer list is silently truncated to the shorter one's length.
    /// Empty find terms are skipped since they would match at every word
    /// boundary.
    pub fn parse(find: &str, replace: &str) -> Self {
        let pairs = find
            .split(',')
            .map(str::trim)
            .zip(replace.split(',').map(str::trim))
            .filter(|(old, _)| !old.is_empty())
            .map(|(old, new)| (old.to_string(), new.to_string()))
            .collect();
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Replace whole-word occurrences of each old phrase, pair by pair.
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (old, new) in &self.pairs {
            let pattern = format!(r"\b{}\b", regex::escape(old));
            match Regex::new(&pattern) {
                Ok(re) => result = re.replace_all(&result, NoExpand(new)).into_owned(),
                Err(e) => tracing::warn!("Skipping replace pair '{old}': {e}"),
            }
        }
        result
    }
}

impl std::fmt::Display for ReplacePairSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self
            .pairs
            .iter()
            .map(|(old, new)| format!("{old}:{new}"))
            .collect();
        write!(f, "{}", rendered.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_truncates_to_shorter_list() {
        let pairs = ReplacePairSet::parse("a, b, c", "x, y");
        assert_eq!(pairs.len(), 2);
        assert_eq!(
            pairs.pairs(),
            &[
                ("a".to_string(), "x".to_string()),
                ("b".to_string(), "y".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_skips_empty_find_terms() {
        assert!(ReplacePairSet::parse("", "").is_empty());
        assert!(ReplacePairSet::parse("", "x").is_empty());
    }

    #[test]
    fn test_apply_whole_words_only() {
        let pairs = ReplacePairSet::parse("cat", "dog");
        assert_eq!(pairs.apply("cat, catgirl, black cat"), "dog, catgirl, black dog");
    }

    #[test]
    fn test_apply_is_literal() {
        let pairs = ReplacePairSet::parse("1girl", "$1 woman");
        assert_eq!(pairs.apply("1girl, solo"), "$1 woman, solo");

        let pairs = ReplacePairSet::parse("a.b", "c");
        assert_eq!(pairs.apply("a.b, axb"), "c, axb");
    }

    #[test]
    fn test_apply_in_order() {
        let pairs = ReplacePairSet::parse("cat, dog", "dog, wolf");
        assert_eq!(pairs.apply("cat"), "wolf");
    }

    #[test]
    fn test_display_parsed_pairs() {
        let pairs = ReplacePairSet::parse("cat, smile", "dog, grin, extra");
        assert_eq!(pairs.to_string(), "cat:dog, smile:grin");
    }
}
