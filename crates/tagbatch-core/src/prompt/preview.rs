//! Labelled preview of where an insertion would land in a prompt.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::text::split_segments;

static LORA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("LORA_RE must compile"));
static WEIGHT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r":\d").expect("WEIGHT_RE must compile"));

/// Marker text standing in for the interrogation in a preview.
pub const INSERT_MARKER: &str = "<interrogation>";

/// Highlight label for a preview segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentLabel {
    Lora,
    Attention,
    Insert,
}

/// One highlighted segment of a preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewSegment {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<SegmentLabel>,
}

/// A full insertion preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertionPreview {
    pub segments: Vec<PreviewSegment>,
    /// Index the marker was placed at, after clamping
    pub index: usize,
    /// Largest valid index (the segment count)
    pub max_index: usize,
}

impl std::fmt::Display for InsertionPreview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self
            .segments
            .iter()
            .map(|s| match s.label {
                Some(SegmentLabel::Lora) => format!("[lora]{}", s.text),
                Some(SegmentLabel::Attention) => format!("[attention]{}", s.text),
                Some(SegmentLabel::Insert) => format!(">>{}<<", s.text),
                None => s.text.clone(),
            })
            .collect();
        write!(f, "{}", rendered.join(", "))
    }
}

/// Label each segment of `text` and place the insertion marker at `index`.
///
/// Segments inside an open `(`/`[` group, closing one, or carrying a `:N`
/// weight are labelled as attention; `<...>` segments as LoRA.
pub fn insertion_preview(text: &str, index: usize) -> InsertionPreview {
    let parts = split_segments(text);
    let index = index.min(parts.len());
    let mut open_groups: usize = 0;

    let mut segments: Vec<PreviewSegment> = parts
        .iter()
        .map(|part| {
            let mut label = LORA_RE.is_match(part).then_some(SegmentLabel::Lora);
            let closes = part.chars().filter(|c| matches!(c, ')' | ']')).count();

            if part.contains(['(', '[']) {
                open_groups += 1;
            }
            if open_groups > 0 || closes > 0 || WEIGHT_RE.is_match(part) {
                label = label.or(Some(SegmentLabel::Attention));
            }
            if closes > 0 {
                open_groups = open_groups.saturating_sub(closes);
            }

            PreviewSegment {
                text: part.to_string(),
                label,
            }
        })
        .collect();

    segments.insert(
        index,
        PreviewSegment {
            text: INSERT_MARKER.to_string(),
            label: Some(SegmentLabel::Insert),
        },
    );

    InsertionPreview {
        segments,
        index,
        max_index: parts.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_labels() {
        let preview = insertion_preview("masterpiece, (red hair, blue eyes:1.2), <lora:foo:1>, solo", 1);
        let labels: Vec<_> = preview.segments.iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            vec![
                None,
                Some(SegmentLabel::Insert),
                Some(SegmentLabel::Attention),
                Some(SegmentLabel::Attention),
                Some(SegmentLabel::Lora),
                None,
            ]
        );
        assert_eq!(preview.max_index, 5);
    }

    #[test]
    fn test_preview_clamps_index() {
        let preview = insertion_preview("a, b", 10);
        assert_eq!(preview.index, 2);
        assert_eq!(preview.segments.last().unwrap().text, INSERT_MARKER);
    }

    #[test]
    fn test_preview_empty_prompt() {
        let preview = insertion_preview("", 3);
        assert_eq!(preview.index, 0);
        assert_eq!(preview.max_index, 0);
        assert_eq!(preview.segments.len(), 1);
    }

    #[test]
    fn test_preview_display() {
        let preview = insertion_preview("a, (b:1.1)", 1);
        assert_eq!(preview.to_string(), "a, >><interrogation><<, [attention](b:1.1)");
    }
}
