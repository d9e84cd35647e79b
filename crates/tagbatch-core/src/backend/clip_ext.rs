//! CLIP interrogator extension backend.
//!
//! Offers several CLIP models and four prompt modes. The extension exposes no
//! unload route, so unloading over HTTP is a logged no-op.

use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::host::{encode_png_base64, HostClient};
use super::{BackendKind, InterrogateRequest, TaggingBackend};
use crate::error::{BackendError, BackendResult};
use crate::types::{Interrogation, SubModel};

/// `/interrogator/prompt` request body.
#[derive(Serialize)]
struct ClipPromptRequest<'a> {
    image: String,
    clip_model_name: &'a str,
    mode: String,
}

/// `/interrogator/prompt` response.
#[derive(Deserialize)]
struct ClipPromptResponse {
    #[serde(default)]
    prompt: String,
}

pub struct ClipExtBackend {
    client: HostClient,
}

impl ClipExtBackend {
    pub fn new(client: HostClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaggingBackend for ClipExtBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::ClipExt
    }

    async fn list_models(&self) -> BackendResult<Vec<SubModel>> {
        let names: Vec<String> = self.client.get_json("/interrogator/models").await?;
        Ok(names
            .into_iter()
            .map(|name| SubModel::new(name.clone(), name))
            .collect())
    }

    async fn interrogate(
        &self,
        image: &DynamicImage,
        request: &InterrogateRequest,
    ) -> BackendResult<Interrogation> {
        let model = request.model.as_deref().unwrap_or(super::discovery::DEFAULT_CLIP_MODEL);
        let body = ClipPromptRequest {
            image: encode_png_base64(image)?,
            clip_model_name: model,
            mode: request.clip_mode.to_string(),
        };
        let resp: ClipPromptResponse = self
            .client
            .post_json("/interrogator/prompt", &body)
            .await
            .map_err(|e| BackendError::Invocation {
                backend: self.name().to_string(),
                model: format!("{model}:{}", request.clip_mode),
                message: e.to_string(),
            })?;
        Ok(Interrogation::Caption(resp.prompt.trim().to_string()))
    }

    async fn unload(&self) -> BackendResult<()> {
        tracing::debug!("{} has no unload route, models stay resident", self.name());
        Ok(())
    }
}
