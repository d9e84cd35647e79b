//! WD14 tagger extension backend.
//!
//! Returns confidence-scored booru tags plus the four content ratings. Older
//! extension builds return one flat `tag -> confidence` map with the ratings
//! mixed in; newer ones split them. Both shapes are accepted.

use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::host::{encode_png_base64, HostClient};
use super::{BackendKind, InterrogateRequest, TaggingBackend};
use crate::error::{BackendError, BackendResult};
use crate::types::{Interrogation, SubModel, Tag};

/// Rating labels the tagger mixes into flat responses.
pub const RATING_LABELS: [&str; 4] = ["general", "sensitive", "questionable", "explicit"];

#[derive(Deserialize)]
struct InterrogatorList {
    #[serde(default)]
    models: Vec<String>,
}

#[derive(Serialize)]
struct WdRequest<'a> {
    image: String,
    model: &'a str,
    threshold: f32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WdCaption {
    Split {
        tag: HashMap<String, f32>,
        #[serde(default)]
        rating: HashMap<String, f32>,
    },
    Flat(HashMap<String, f32>),
}

#[derive(Deserialize)]
struct WdResponse {
    caption: WdCaption,
}

/// Confidence-descending order, name as tiebreak so output is stable.
fn sorted(map: HashMap<String, f32>) -> Vec<Tag> {
    let mut tags: Vec<Tag> = map.into_iter().map(|(n, c)| Tag::new(n, c)).collect();
    tags.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    tags
}

impl WdCaption {
    /// Tags come back unfiltered beyond the server-side threshold; selection
    /// against the user threshold and keep-tags happens in the orchestrator.
    fn into_interrogation(self) -> Interrogation {
        let (tags, ratings) = match self {
            WdCaption::Split { tag, rating } => (tag, rating),
            WdCaption::Flat(all) => all
                .into_iter()
                .partition(|(name, _)| !RATING_LABELS.contains(&name.as_str())),
        };
        Interrogation::Scored {
            tags: sorted(tags),
            ratings: sorted(ratings),
        }
    }
}

pub struct WdExtBackend {
    client: HostClient,
}

impl WdExtBackend {
    pub fn new(client: HostClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaggingBackend for WdExtBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::WdExt
    }

    async fn list_models(&self) -> BackendResult<Vec<SubModel>> {
        let list: InterrogatorList = self.client.get_json("/tagger/v1/interrogators").await?;
        Ok(list
            .models
            .into_iter()
            .map(|name| SubModel::new(name.clone(), name))
            .collect())
    }

    async fn interrogate(
        &self,
        image: &DynamicImage,
        request: &InterrogateRequest,
    ) -> BackendResult<Interrogation> {
        let model = request.model.as_deref().ok_or_else(|| BackendError::Invocation {
            backend: self.name().to_string(),
            model: String::new(),
            message: "no tagger model selected".to_string(),
        })?;
        let body = WdRequest {
            image: encode_png_base64(image)?,
            model,
            threshold: request.threshold,
        };
        let resp: WdResponse = self
            .client
            .post_json("/tagger/v1/interrogate", &body)
            .await
            .map_err(|e| BackendError::Invocation {
                backend: self.name().to_string(),
                model: model.to_string(),
                message: e.to_string(),
            })?;
        Ok(resp.caption.into_interrogation())
    }

    async fn unload(&self) -> BackendResult<()> {
        let _: serde_json::Value = self
            .client
            .post_json("/tagger/v1/unload-interrogators", &serde_json::json!({}))
            .await?;
        tracing::debug!("Unloaded {} interrogators", self.name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tags: &[Tag]) -> Vec<&str> {
        tags.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_flat_response_splits_ratings() {
        let resp: WdResponse = serde_json::from_str(
            r#"{"caption": {"1girl": 0.98, "general": 0.7, "smile": 0.6, "explicit": 0.01, "hat": 0.2}}"#,
        )
        .unwrap();
        let Interrogation::Scored { tags, ratings } = resp.caption.into_interrogation() else {
            panic!("expected scored output");
        };
        assert_eq!(names(&tags), vec!["1girl", "smile", "hat"]);
        assert_eq!(names(&ratings), vec!["general", "explicit"]);
    }

    #[test]
    fn test_split_response() {
        let resp: WdResponse = serde_json::from_str(
            r#"{"caption": {"tag": {"cat": 0.5, "outdoors": 0.9}, "rating": {"sensitive": 0.3, "general": 0.6}}}"#,
        )
        .unwrap();
        let Interrogation::Scored { tags, ratings } = resp.caption.into_interrogation() else {
            panic!("expected scored output");
        };
        assert_eq!(names(&tags), vec!["outdoors", "cat"]);
        assert_eq!(names(&ratings), vec!["general", "sensitive"]);
    }

    #[test]
    fn test_interrogator_list_parse() {
        let list: InterrogatorList =
            serde_json::from_str(r#"{"models": ["wd14-vit-v2", "wd14-convnext"]}"#).unwrap();
        assert_eq!(list.models.len(), 2);
    }
}
