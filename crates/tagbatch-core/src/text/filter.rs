//! Overlap filtering between an interrogation and a reference prompt.

use std::collections::HashSet;

use super::normalize::strip_attention_syntax;

/// Drop candidate segments whose attention-stripped form appears in `reference`.
///
/// Both inputs are split on commas. Reference segments are normalized with
/// [`strip_attention_syntax`]; candidate segments are compared in normalized
/// form and survivors are emitted that way too. An empty reference filters
/// nothing.
///
/// ```
/// use tagbatch_core::text::filter_overlap;
///
/// assert_eq!(filter_overlap("cat, dog, (bird:0.5)", "dog"), "cat, bird");
/// ```
pub fn filter_overlap(candidate: &str, reference: &str) -> String {
    let reference: HashSet<String> = reference
        .split(',')
        .map(strip_attention_syntax)
        .filter(|s| !s.is_empty())
        .collect();

    candidate
        .split(',')
        .map(strip_attention_syntax)
        .filter(|segment| !segment.is_empty() && !reference.contains(segment))
        .collect::<Vec<_>>()
        .join(", ")
}
