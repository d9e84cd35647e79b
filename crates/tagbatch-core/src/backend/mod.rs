//! Tagging backends and the registry that exposes them uniformly.
//!
//! Every backend implements [`TaggingBackend`] and is registered once at
//! startup. Two native backends are always present; the two extension backends
//! are registered only when the host reports them installed and enabled.

pub mod clip_ext;
pub mod discovery;
pub mod host;
pub mod model_keys;
pub mod native;
pub mod registry;
pub mod wd_ext;

pub use discovery::discover;
pub use host::HostClient;
pub use model_keys::ModelKeyMap;
pub use registry::BackendRegistry;

use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::BackendResult;
use crate::types::{ClipMode, Interrogation, SubModel};

/// The four backends the orchestrator knows how to drive.
///
/// Ordering is the order backends are listed to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    #[serde(rename = "CLIP (EXT)")]
    ClipExt,
    #[serde(rename = "CLIP (Native)")]
    ClipNative,
    #[serde(rename = "Deepbooru (Native)")]
    DeepbooruNative,
    #[serde(rename = "WD (EXT)")]
    WdExt,
}

impl BackendKind {
    pub const ALL: [BackendKind; 4] = [
        BackendKind::ClipExt,
        BackendKind::ClipNative,
        BackendKind::DeepbooruNative,
        BackendKind::WdExt,
    ];

    /// Name shown to users and accepted in configuration.
    pub fn display_name(self) -> &'static str {
        match self {
            BackendKind::ClipExt => "CLIP (EXT)",
            BackendKind::ClipNative => "CLIP (Native)",
            BackendKind::DeepbooruNative => "Deepbooru (Native)",
            BackendKind::WdExt => "WD (EXT)",
        }
    }

    /// Host extension that provides this backend, if it is optional.
    pub fn extension_name(self) -> Option<&'static str> {
        match self {
            BackendKind::ClipExt => Some(discovery::CLIP_EXTENSION),
            BackendKind::WdExt => Some(discovery::WD_EXTENSION),
            BackendKind::ClipNative | BackendKind::DeepbooruNative => None,
        }
    }

    /// Whether the backend runs a user-selected list of sub-models.
    pub fn is_multi_model(self) -> bool {
        matches!(self, BackendKind::ClipExt | BackendKind::WdExt)
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    /// Accepts display names (case-insensitive) and short aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let kind = match lowered.as_str() {
            "clip-ext" | "clip_ext" => Some(BackendKind::ClipExt),
            "clip" | "clip-native" => Some(BackendKind::ClipNative),
            "deepbooru" | "deepbooru-native" => Some(BackendKind::DeepbooruNative),
            "wd" | "wd-ext" | "wd14" => Some(BackendKind::WdExt),
            _ => BackendKind::ALL
                .into_iter()
                .find(|k| k.display_name().to_lowercase() == lowered),
        };
        kind.ok_or_else(|| {
            format!(
                "Unknown backend '{s}' (expected one of: {})",
                BackendKind::ALL.map(|k| k.display_name()).join(", ")
            )
        })
    }
}

/// Parameters for one backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct InterrogateRequest {
    /// Sub-model key for multi-model backends
    pub model: Option<String>,

    /// CLIP extension mode
    pub clip_mode: ClipMode,

    /// Confidence threshold hint for scored backends
    pub threshold: f32,
}

impl Default for InterrogateRequest {
    fn default() -> Self {
        Self {
            model: None,
            clip_mode: ClipMode::Best,
            threshold: 0.35,
        }
    }
}

impl InterrogateRequest {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Default::default()
        }
    }
}

/// Capability contract every tagging backend implements.
///
/// Uses `async_trait` because the registry stores `Arc<dyn TaggingBackend>`.
#[async_trait]
pub trait TaggingBackend: Send + Sync {
    /// Which backend this is.
    fn kind(&self) -> BackendKind;

    /// Name for logging.
    fn name(&self) -> &str {
        self.kind().display_name()
    }

    /// Sub-models offered by a multi-model backend.
    async fn list_models(&self) -> BackendResult<Vec<SubModel>> {
        Ok(Vec::new())
    }

    /// Interrogate one image.
    async fn interrogate(
        &self,
        image: &DynamicImage,
        request: &InterrogateRequest,
    ) -> BackendResult<Interrogation>;

    /// Release loaded models. Idempotent.
    async fn unload(&self) -> BackendResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_display_names_and_aliases() {
        assert_eq!("WD (EXT)".parse::<BackendKind>().unwrap(), BackendKind::WdExt);
        assert_eq!("deepbooru (native)".parse::<BackendKind>().unwrap(), BackendKind::DeepbooruNative);
        assert_eq!("clip".parse::<BackendKind>().unwrap(), BackendKind::ClipNative);
        assert_eq!("clip-ext".parse::<BackendKind>().unwrap(), BackendKind::ClipExt);
        assert!("blip".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_kind_order_matches_listing() {
        let mut kinds = vec![
            BackendKind::WdExt,
            BackendKind::DeepbooruNative,
            BackendKind::ClipExt,
            BackendKind::ClipNative,
        ];
        kinds.sort();
        assert_eq!(kinds, BackendKind::ALL.to_vec());
    }

    #[test]
    fn test_kind_serde_uses_display_names() {
        let json = serde_json::to_string(&BackendKind::ClipNative).unwrap();
        assert_eq!(json, "\"CLIP (Native)\"");
        let kind: BackendKind = serde_json::from_str("\"WD (EXT)\"").unwrap();
        assert_eq!(kind, BackendKind::WdExt);
    }

    #[test]
    fn test_extension_names() {
        assert_eq!(BackendKind::WdExt.extension_name(), Some(discovery::WD_EXTENSION));
        assert_eq!(BackendKind::ClipNative.extension_name(), None);
        assert!(BackendKind::ClipExt.is_multi_model());
        assert!(!BackendKind::DeepbooruNative.is_multi_model());
    }
}
