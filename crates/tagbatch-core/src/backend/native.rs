//! The host's built-in CLIP caption and Deepbooru tag interrogators.

use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::host::{encode_png_base64, HostClient};
use super::{BackendKind, InterrogateRequest, TaggingBackend};
use crate::error::{BackendError, BackendResult};
use crate::types::Interrogation;

/// `/sdapi/v1/interrogate` request body.
#[derive(Serialize)]
struct NativeRequest<'a> {
    image: String,
    model: &'a str,
}

/// `/sdapi/v1/interrogate` response.
#[derive(Deserialize)]
struct NativeResponse {
    #[serde(default)]
    caption: String,
}

/// One of the two always-present native interrogators.
pub struct NativeBackend {
    kind: BackendKind,
    client: HostClient,
}

impl NativeBackend {
    pub fn clip(client: HostClient) -> Self {
        Self {
            kind: BackendKind::ClipNative,
            client,
        }
    }

    pub fn deepbooru(client: HostClient) -> Self {
        Self {
            kind: BackendKind::DeepbooruNative,
            client,
        }
    }

    /// Model identifier the host API expects.
    fn api_model(&self) -> &'static str {
        match self.kind {
            BackendKind::DeepbooruNative => "deepdanbooru",
            _ => "clip",
        }
    }
}

#[async_trait]
impl TaggingBackend for NativeBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn interrogate(
        &self,
        image: &DynamicImage,
        _request: &InterrogateRequest,
    ) -> BackendResult<Interrogation> {
        let body = NativeRequest {
            image: encode_png_base64(image)?,
            model: self.api_model(),
        };
        let resp: NativeResponse = self
            .client
            .post_json("/sdapi/v1/interrogate", &body)
            .await
            .map_err(|e| BackendError::Invocation {
                backend: self.name().to_string(),
                model: self.api_model().to_string(),
                message: e.to_string(),
            })?;
        Ok(Interrogation::Caption(resp.caption.trim().to_string()))
    }
}
