//! Core data types shared across the interrogation pipeline.

use serde::{Deserialize, Serialize};

/// A tag produced by an interrogation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// The tag label (e.g., "long_hair", "smile")
    pub name: String,

    /// Confidence score from 0.0 to 1.0
    pub confidence: f32,
}

impl Tag {
    /// Create a new tag with the given name and confidence.
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

/// Tags selected from one backend/sub-model, with the threshold used to select them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagSet {
    /// Backend display name the tags came from
    pub source: String,

    /// Confidence threshold the tags were selected with
    pub threshold: f32,

    /// Tags in backend order
    pub tags: Vec<Tag>,
}

impl TagSet {
    pub fn contains(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    /// Drop repeated tag names, keeping the first occurrence.
    pub fn dedup(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.tags.retain(|t| seen.insert(t.name.clone()));
    }
}

/// Raw output of a single backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Interrogation {
    /// Free-text caption or an already comma-joined tag string
    Caption(String),

    /// Confidence-scored tags plus rating labels
    Scored { tags: Vec<Tag>, ratings: Vec<Tag> },
}

impl Interrogation {
    /// An interrogation that contributes nothing.
    pub fn empty() -> Self {
        Interrogation::Caption(String::new())
    }

    /// Whether this interrogation carries no text or tags.
    pub fn is_empty(&self) -> bool {
        match self {
            Interrogation::Caption(text) => text.trim().is_empty(),
            Interrogation::Scored { tags, ratings } => tags.is_empty() && ratings.is_empty(),
        }
    }
}

/// A named variant within a multi-model backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubModel {
    /// Key the backend uses internally
    pub key: String,

    /// Human-readable name shown to the user
    pub display_name: String,
}

impl SubModel {
    pub fn new(key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
        }
    }
}

/// Which prompt field an insertion targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertTarget {
    #[default]
    Prompt,
    NegativePrompt,
}

/// Where the interrogation lands in the target prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PlacementPolicy {
    /// Interrogation goes in front of the existing text
    #[default]
    Prepend,

    /// Interrogation goes after the existing text
    Append,

    /// Interrogation is spliced in as one segment at `index` (clamped)
    InsertAtIndex { target: InsertTarget, index: usize },
}

/// CLIP interrogator extension modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipMode {
    #[default]
    Best,
    Fast,
    Classic,
    Negative,
}

impl std::fmt::Display for ClipMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipMode::Best => write!(f, "best"),
            ClipMode::Fast => write!(f, "fast"),
            ClipMode::Classic => write!(f, "classic"),
            ClipMode::Negative => write!(f, "negative"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_set_dedup_keeps_first() {
        let mut set = TagSet {
            source: "WD (EXT)".into(),
            threshold: 0.35,
            tags: vec![Tag::new("cat", 0.9), Tag::new("dog", 0.8), Tag::new("cat", 0.4)],
        };
        set.dedup();
        assert_eq!(set.tags.len(), 2);
        assert_eq!(set.tags[0].confidence, 0.9);
        assert!(set.contains("dog"));
    }

    #[test]
    fn test_interrogation_is_empty() {
        assert!(Interrogation::empty().is_empty());
        assert!(Interrogation::Caption("  ".into()).is_empty());
        assert!(!Interrogation::Scored {
            tags: vec![],
            ratings: vec![Tag::new("general", 0.9)],
        }
        .is_empty());
    }

    #[test]
    fn test_placement_policy_toml_shape() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            placement: PlacementPolicy,
        }

        let parsed: Wrapper = toml::from_str(
            "[placement]\nmode = \"insert_at_index\"\ntarget = \"negative_prompt\"\nindex = 2\n",
        )
        .unwrap();
        assert_eq!(
            parsed.placement,
            PlacementPolicy::InsertAtIndex {
                target: InsertTarget::NegativePrompt,
                index: 2
            }
        );

        let parsed: Wrapper = toml::from_str("[placement]\nmode = \"append\"\n").unwrap();
        assert_eq!(parsed.placement, PlacementPolicy::Append);
    }

    #[test]
    fn test_clip_mode_display() {
        assert_eq!(ClipMode::Best.to_string(), "best");
        assert_eq!(ClipMode::Negative.to_string(), "negative");
    }
}
