//! Splices interrogation text into the prompt or negative prompt.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::job::GenerationJob;
use crate::text::split_segments;
use crate::types::{InsertTarget, PlacementPolicy};

static EXTRA_NETWORK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("EXTRA_NETWORK_RE must compile"));

/// Trim trailing commas and spaces (the `", "` separator tail).
pub fn trim_separator_tail(text: &str) -> &str {
    text.trim_end_matches([',', ' '])
}

/// Normalize the interrogation's tail and optionally wrap it in attention syntax.
///
/// Output always ends with `", "`: `"a, b, "` or `"(a, b:0.5), "`.
pub fn finalize_interrogation(text: &str, weight: Option<f32>) -> String {
    let body = trim_separator_tail(text);
    match weight {
        Some(weight) => format!("({body}:{weight}), "),
        None => format!("{body}, "),
    }
}

/// Remove `<...>` extra-network markers (LoRA, hypernetworks) from a prompt.
pub fn strip_extra_networks(prompt: &str) -> String {
    EXTRA_NETWORK_RE.replace_all(prompt, "").into_owned()
}

/// The prompt field an interrogation lands in.
///
/// An explicit insertion target wins; otherwise reverse mode selects the
/// negative prompt.
pub fn target_field(placement: &PlacementPolicy, reverse: bool) -> InsertTarget {
    match placement {
        PlacementPolicy::InsertAtIndex { target, .. } => *target,
        _ if reverse => InsertTarget::NegativePrompt,
        _ => InsertTarget::Prompt,
    }
}

/// Splice `interrogation` into `target` as a single segment at `index`.
///
/// The index is clamped to `[0, segment_count]`.
pub fn insert_at_index(target: &str, interrogation: &str, index: usize) -> String {
    let mut segments = split_segments(target);
    let index = index.min(segments.len());
    segments.insert(index, trim_separator_tail(interrogation));
    segments.join(", ")
}

/// Result of composing one interrogation into a job's prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub prompt: String,
    pub negative_prompt: String,
    /// Which field received the interrogation
    pub target: InsertTarget,
    /// Exact text spliced into the target field, separator included
    pub injected: String,
}

impl ComposedPrompt {
    /// The text of the field that received the interrogation.
    pub fn target_text(&self) -> &str {
        match self.target {
            InsertTarget::Prompt => &self.prompt,
            InsertTarget::NegativePrompt => &self.negative_prompt,
        }
    }

    /// Write the composed field back into the job.
    ///
    /// A positive result also refreshes the tokenized `batch_prompts` the
    /// generator consumes, with extra-network markers removed from that copy
    /// only.
    pub fn write_back(&self, job: &mut GenerationJob, batch_prompts: &mut [String]) {
        match self.target {
            InsertTarget::Prompt => {
                job.prompt = self.prompt.clone();
                for p in job.all_prompts.iter_mut() {
                    *p = self.prompt.clone();
                }
                let tokenized = strip_extra_networks(&self.prompt);
                for p in batch_prompts.iter_mut() {
                    *p = tokenized.clone();
                }
            }
            InsertTarget::NegativePrompt => {
                job.negative_prompt = self.negative_prompt.clone();
                for p in job.all_negative_prompts.iter_mut() {
                    *p = self.negative_prompt.clone();
                }
            }
        }
    }
}

/// Compose `interrogation` into the prompt pair according to `placement`.
///
/// `interrogation` is expected to be finalized (see [`finalize_interrogation`]).
/// An empty target field becomes the interrogation alone.
pub fn compose(
    prompt: &str,
    negative_prompt: &str,
    interrogation: &str,
    placement: &PlacementPolicy,
    reverse: bool,
) -> ComposedPrompt {
    let target = target_field(placement, reverse);
    let existing = match target {
        InsertTarget::Prompt => prompt,
        InsertTarget::NegativePrompt => negative_prompt,
    };

    let (composed, injected) = if existing.is_empty() {
        (interrogation.to_string(), interrogation.to_string())
    } else {
        match placement {
            PlacementPolicy::Append => (
                format!("{}, {}", trim_separator_tail(existing), interrogation),
                interrogation.to_string(),
            ),
            PlacementPolicy::InsertAtIndex { index, .. } => {
                let body = trim_separator_tail(interrogation);
                let count = split_segments(existing).len();
                let injected = if count == 0 {
                    body.to_string()
                } else if (*index).min(count) < count {
                    format!("{body}, ")
                } else {
                    format!(", {body}")
                };
                (insert_at_index(existing, interrogation, *index), injected)
            }
            PlacementPolicy::Prepend => {
                (format!("{interrogation}{existing}"), interrogation.to_string())
            }
        }
    };

    let (prompt, negative_prompt) = match target {
        InsertTarget::Prompt => (composed, negative_prompt.to_string()),
        InsertTarget::NegativePrompt => (prompt.to_string(), composed),
    };

    ComposedPrompt {
        prompt,
        negative_prompt,
        target,
        injected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_target_is_interrogation_alone() {
        let composed = compose("", "bad", "cat, dog, ", &PlacementPolicy::Prepend, false);
        assert_eq!(composed.prompt, "cat, dog, ");
        assert_eq!(composed.negative_prompt, "bad");
    }

    #[test]
    fn test_prepend() {
        let composed = compose("solo", "", "cat, ", &PlacementPolicy::Prepend, false);
        assert_eq!(composed.prompt, "cat, solo");
    }

    #[test]
    fn test_append_trims_tail() {
        let composed = compose("solo, ", "", "cat, ", &PlacementPolicy::Append, false);
        assert_eq!(composed.prompt, "solo, cat, ");
    }

    #[test]
    fn test_insert_at_index() {
        let placement = PlacementPolicy::InsertAtIndex {
            target: InsertTarget::Prompt,
            index: 1,
        };
        let composed = compose("a, b, c", "", "X", &placement, false);
        assert_eq!(composed.prompt, "a, X, b, c");
        assert_eq!(composed.injected, "X, ");
    }

    #[test]
    fn test_insert_at_end_injects_leading_separator() {
        let placement = PlacementPolicy::InsertAtIndex {
            target: InsertTarget::Prompt,
            index: 5,
        };
        let composed = compose("a, b", "", "X, ", &placement, false);
        assert_eq!(composed.prompt, "a, b, X");
        assert_eq!(composed.injected, ", X");
        assert_eq!(composed.prompt.replace(&composed.injected, ""), "a, b");
    }

    #[test]
    fn test_insert_index_is_clamped() {
        assert_eq!(insert_at_index("a, b", "X, ", 99), "a, b, X");
        assert_eq!(insert_at_index("a, b", "X, ", 0), "X, a, b");
    }

    #[test]
    fn test_insert_keeps_attention_and_lora_segments() {
        assert_eq!(
            insert_at_index("(a:1.2), <lora:foo:0.8>, b", "X", 2),
            "(a:1.2), <lora:foo:0.8>, X, b"
        );
    }

    #[test]
    fn test_insert_into_negative_ignores_reverse() {
        let placement = PlacementPolicy::InsertAtIndex {
            target: InsertTarget::NegativePrompt,
            index: 0,
        };
        let composed = compose("solo", "blurry", "cat, ", &placement, false);
        assert_eq!(composed.prompt, "solo");
        assert_eq!(composed.negative_prompt, "cat, blurry");
        assert_eq!(composed.target, InsertTarget::NegativePrompt);
    }

    #[test]
    fn test_reverse_mode_targets_negative() {
        let composed = compose("solo", "blurry", "cat, ", &PlacementPolicy::Prepend, true);
        assert_eq!(composed.prompt, "solo");
        assert_eq!(composed.negative_prompt, "cat, blurry");
        assert_eq!(composed.target_text(), "cat, blurry");
    }

    #[test]
    fn test_finalize_interrogation() {
        assert_eq!(finalize_interrogation("a, b, , ", None), "a, b, ");
        assert_eq!(finalize_interrogation("a, b, ", Some(0.5)), "(a, b:0.5), ");
        assert_eq!(finalize_interrogation("", None), ", ");
    }

    #[test]
    fn test_strip_extra_networks() {
        assert_eq!(
            strip_extra_networks("cat, <lora:foo:0.8>, dog <hypernet:bar:1>"),
            "cat, , dog "
        );
    }

    #[test]
    fn test_write_back_positive() {
        let mut job = GenerationJob {
            prompt: "old".into(),
            all_prompts: vec!["old".into(), "old".into()],
            ..Default::default()
        };
        let mut batch_prompts = vec!["old".to_string()];
        let composed = compose("old", "", "<lora:x:1>, cat, ", &PlacementPolicy::Prepend, false);
        composed.write_back(&mut job, &mut batch_prompts);

        assert_eq!(job.prompt, "<lora:x:1>, cat, old");
        assert!(job.all_prompts.iter().all(|p| p == "<lora:x:1>, cat, old"));
        assert_eq!(batch_prompts[0], ", cat, old");
    }

    #[test]
    fn test_write_back_negative_leaves_positive_lists() {
        let mut job = GenerationJob {
            prompt: "solo".into(),
            negative_prompt: "blurry".into(),
            all_prompts: vec!["solo".into()],
            all_negative_prompts: vec!["blurry".into()],
            ..Default::default()
        };
        let mut batch_prompts = vec!["solo".to_string()];
        let composed = compose("solo", "blurry", "cat, ", &PlacementPolicy::Prepend, true);
        composed.write_back(&mut job, &mut batch_prompts);

        assert_eq!(job.negative_prompt, "cat, blurry");
        assert_eq!(job.all_negative_prompts, vec!["cat, blurry".to_string()]);
        assert_eq!(job.prompt, "solo");
        assert_eq!(batch_prompts[0], "solo");
    }
}
