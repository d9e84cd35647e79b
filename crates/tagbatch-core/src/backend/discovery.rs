//! Build the backend registry from what the host has installed.

use std::sync::Arc;

use super::clip_ext::ClipExtBackend;
use super::host::{ExtensionInfo, HostClient};
use super::native::NativeBackend;
use super::wd_ext::WdExtBackend;
use super::{BackendKind, BackendRegistry};
use crate::error::BackendError;

pub const CLIP_EXTENSION: &str = "clip-interrogator-ext";
pub const WD_EXTENSION: &str = "stable-diffusion-webui-wd14-tagger";

/// CLIP model used when a request names none.
pub const DEFAULT_CLIP_MODEL: &str = "ViT-L-14/openai";

/// Whether `name` is listed and enabled.
fn is_enabled(extensions: &[ExtensionInfo], name: &str) -> bool {
    extensions.iter().any(|ext| ext.name == name && ext.enabled)
}

/// Extension backends the listing says are installed and enabled.
pub fn enabled_extension_backends(extensions: &[ExtensionInfo]) -> Vec<BackendKind> {
    BackendKind::ALL
        .into_iter()
        .filter(|kind| {
            kind.extension_name()
                .is_some_and(|name| is_enabled(extensions, name))
        })
        .collect()
}

/// Register the native backends and any enabled extension backends.
///
/// A failed probe leaves only the natives registered.
pub async fn discover(client: HostClient) -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register(Arc::new(NativeBackend::clip(client.clone())));
    registry.register(Arc::new(NativeBackend::deepbooru(client.clone())));

    let extensions = match client.extensions().await {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!("Extension probe at {} failed: {e}", client.base_url());
            Vec::new()
        }
    };
    let enabled = enabled_extension_backends(&extensions);

    for kind in [BackendKind::ClipExt, BackendKind::WdExt] {
        if !enabled.contains(&kind) {
            let missing = BackendError::Missing(kind.extension_name().unwrap_or_default().to_string());
            tracing::info!("{kind} not registered: {missing}");
            continue;
        }
        match kind {
            BackendKind::ClipExt => registry.register(Arc::new(ClipExtBackend::new(client.clone()))),
            BackendKind::WdExt => registry.register(Arc::new(WdExtBackend::new(client.clone()))),
            BackendKind::ClipNative | BackendKind::DeepbooruNative => {}
        }
    }

    tracing::info!(
        "Available backends: {}",
        registry.available_backend_names().join(", ")
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostConfig;

    fn ext(name: &str, enabled: bool) -> ExtensionInfo {
        ExtensionInfo {
            name: name.into(),
            enabled,
        }
    }

    #[test]
    fn test_enabled_extension_backends() {
        let listing = vec![
            ext("sd-webui-controlnet", true),
            ext(WD_EXTENSION, true),
            ext(CLIP_EXTENSION, false),
        ];
        assert_eq!(enabled_extension_backends(&listing), vec![BackendKind::WdExt]);
        assert!(enabled_extension_backends(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_failed_probe_registers_natives_only() {
        let client = HostClient::new(&HostConfig {
            url: "http://127.0.0.1:1".into(),
            timeout_ms: 500,
            probe_timeout_ms: 500,
        });
        let registry = discover(client).await;
        assert_eq!(
            registry.available(),
            vec![BackendKind::ClipNative, BackendKind::DeepbooruNative]
        );
    }
}
