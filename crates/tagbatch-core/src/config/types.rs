//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::backend::BackendKind;
use crate::backend::discovery::DEFAULT_CLIP_MODEL;
use crate::types::{ClipMode, PlacementPolicy};

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the persisted filter, keep-tags and replace files
    pub settings_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            settings_dir: PathBuf::from("~/.tagbatch"),
        }
    }
}

/// Connection to the host web UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Base URL of the host API
    pub url: String,

    /// Per-request timeout for interrogation calls, in milliseconds
    pub timeout_ms: u64,

    /// Timeout for the extension probe at startup, in milliseconds
    pub probe_timeout_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:7860".to_string(),
            timeout_ms: 120_000,
            probe_timeout_ms: 5_000,
        }
    }
}

/// Every option of a batch interrogation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterrogationConfig {
    /// Master switch
    pub enabled: bool,

    /// Backends to run, in order
    pub backends: Vec<BackendKind>,

    /// Where the interrogation lands
    pub placement: PlacementPolicy,

    /// Target the negative prompt instead of the prompt
    pub reverse_mode: bool,

    /// Keep duplicate tags across backends
    pub exaggeration_mode: bool,

    /// Wrap the interrogation in `(text:weight)`
    pub use_prompt_weight: bool,

    /// Weight used when `use_prompt_weight` is set
    pub prompt_weight: f32,

    /// Log the composed prompt after each interrogation
    pub prompt_output: bool,

    /// Drop tags already present in the prompt
    pub use_positive_filter: bool,

    /// Drop tags present in the negative prompt
    pub use_negative_filter: bool,

    /// Drop tags listed in `custom_filter`
    pub use_custom_filter: bool,

    /// Comma list of tags to drop
    pub custom_filter: String,

    /// Apply the find/replace pairs
    pub use_custom_replace: bool,

    /// Comma list of terms to find
    pub custom_find: String,

    /// Comma list of replacements, parallel to `custom_find`
    pub custom_replace: String,

    /// Strip punctuation except emoticons
    pub no_punctuation_mode: bool,

    /// CLIP extension models to run
    pub clip_ext_models: Vec<String>,

    /// CLIP extension prompt mode
    pub clip_ext_mode: ClipMode,

    /// Unload CLIP extension models after each step
    pub unload_clip_after_use: bool,

    /// WD tagger models to run, by display name
    pub wd_models: Vec<String>,

    /// Minimum confidence for WD tags
    pub wd_threshold: f32,

    /// Replace underscores in WD tags with spaces
    pub wd_underscore_fix: bool,

    /// Append ratings above `wd_rating_threshold`
    pub wd_append_ratings: bool,

    /// Minimum confidence for appended ratings
    pub wd_rating_threshold: f32,

    /// Comma list of tags kept regardless of `wd_threshold`
    pub wd_keep_tags: String,

    /// Unload WD models after each step
    pub unload_wd_after_use: bool,
}

impl Default for InterrogationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backends: vec![BackendKind::DeepbooruNative],
            placement: PlacementPolicy::Prepend,
            reverse_mode: false,
            exaggeration_mode: false,
            use_prompt_weight: false,
            prompt_weight: 0.5,
            prompt_output: true,
            use_positive_filter: false,
            use_negative_filter: false,
            use_custom_filter: false,
            custom_filter: String::new(),
            use_custom_replace: false,
            custom_find: String::new(),
            custom_replace: String::new(),
            no_punctuation_mode: false,
            clip_ext_models: vec![DEFAULT_CLIP_MODEL.to_string()],
            clip_ext_mode: ClipMode::Best,
            unload_clip_after_use: true,
            wd_models: Vec::new(),
            wd_threshold: 0.35,
            wd_underscore_fix: true,
            wd_append_ratings: false,
            wd_rating_threshold: 0.5,
            wd_keep_tags: String::new(),
            unload_wd_after_use: true,
        }
    }
}

impl InterrogationConfig {
    /// Weight applied to the interrogation, if weighting is on.
    pub fn weight(&self) -> Option<f32> {
        self.use_prompt_weight.then_some(self.prompt_weight)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
