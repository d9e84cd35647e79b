//! HTTP client for the host web UI's API.
//!
//! All backends reach their models through the host process, so they share one
//! client. Images travel as base64-encoded PNG.

use base64::Engine;
use image::{DynamicImage, ImageFormat};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::time::Duration;

use crate::config::HostConfig;
use crate::error::{BackendError, BackendResult};

/// One entry of the host's extension listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionInfo {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
}

/// Shared client for the host API.
#[derive(Debug, Clone)]
pub struct HostClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
    probe_timeout: Duration,
}

impl HostClient {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout: Duration::from_millis(config.timeout_ms),
            probe_timeout: Duration::from_millis(config.probe_timeout_ms),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(
        url: &str,
        resp: reqwest::Response,
    ) -> BackendResult<T> {
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(BackendError::Http {
                url: url.to_string(),
                message: format!("HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }
        resp.json().await.map_err(|e| BackendError::Http {
            url: url.to_string(),
            message: format!("Failed to parse response: {e}"),
            status_code: None,
        })
    }

    fn transport_error(url: &str, e: reqwest::Error) -> BackendError {
        BackendError::Http {
            url: url.to_string(),
            message: format!("Request failed: {e}"),
            status_code: e.status().map(|s| s.as_u16()),
        }
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        let url = self.url(path);
        let resp = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Self::transport_error(&url, e))?;
        Self::read_json(&url, resp).await
    }

    /// POST a JSON body to `path` and decode the JSON response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> BackendResult<T> {
        let url = self.url(path);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Self::transport_error(&url, e))?;
        Self::read_json(&url, resp).await
    }

    /// List the host's installed extensions.
    pub async fn extensions(&self) -> BackendResult<Vec<ExtensionInfo>> {
        let url = self.url("/sdapi/v1/extensions");
        let resp = self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| Self::transport_error(&url, e))?;
        Self::read_json(&url, resp).await
    }
}

/// Encode an image as base64 PNG for the host API.
pub fn encode_png_base64(image: &DynamicImage) -> BackendResult<String> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| BackendError::Encode(e.to_string()))?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = HostConfig {
            url: "http://127.0.0.1:7860/".into(),
            ..Default::default()
        };
        let client = HostClient::new(&config);
        assert_eq!(client.base_url(), "http://127.0.0.1:7860");
        assert_eq!(client.url("/sdapi/v1/extensions"), "http://127.0.0.1:7860/sdapi/v1/extensions");
    }

    #[test]
    fn test_encode_png_base64() {
        let image = DynamicImage::new_rgb8(4, 4);
        let encoded = encode_png_base64(&image).unwrap();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        // PNG signature
        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_extension_listing_parses_host_shape() {
        let json = r#"[
            {"name": "stable-diffusion-webui-wd14-tagger", "remote": "https://example.invalid", "enabled": true, "version": "abc"},
            {"name": "clip-interrogator-ext", "enabled": false}
        ]"#;
        let parsed: Vec<ExtensionInfo> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(parsed[0].enabled);
        assert!(!parsed[1].enabled);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        let config = HostConfig {
            url: "http://127.0.0.1:1".into(),
            timeout_ms: 500,
            probe_timeout_ms: 500,
        };
        let client = HostClient::new(&config);
        let err = client.extensions().await.unwrap_err();
        assert!(matches!(err, BackendError::Http { .. }));
    }
}
