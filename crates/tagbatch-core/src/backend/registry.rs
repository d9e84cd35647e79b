//! Uniform access to whichever backends were registered at startup.

use image::DynamicImage;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{BackendKind, InterrogateRequest, TaggingBackend};
use crate::error::BackendResult;
use crate::types::{Interrogation, SubModel};

/// Registered backends keyed by kind.
///
/// Calls against a kind that was never registered are logged and return an
/// empty result rather than an error.
#[derive(Default, Clone)]
pub struct BackendRegistry {
    backends: BTreeMap<BackendKind, Arc<dyn TaggingBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend, replacing any earlier one of the same kind.
    pub fn register(&mut self, backend: Arc<dyn TaggingBackend>) {
        let kind = backend.kind();
        if self.backends.insert(kind, backend).is_some() {
            tracing::debug!("Replaced registered backend {kind}");
        } else {
            tracing::debug!("Registered backend {kind}");
        }
    }

    pub fn is_registered(&self, kind: BackendKind) -> bool {
        self.backends.contains_key(&kind)
    }

    pub fn get(&self, kind: BackendKind) -> Option<&Arc<dyn TaggingBackend>> {
        self.backends.get(&kind)
    }

    /// Registered kinds in listing order.
    pub fn available(&self) -> Vec<BackendKind> {
        self.backends.keys().copied().collect()
    }

    /// Display names of registered backends in listing order.
    pub fn available_backend_names(&self) -> Vec<&'static str> {
        self.backends.keys().map(|k| k.display_name()).collect()
    }

    fn missing(kind: BackendKind) {
        tracing::warn!("Backend {kind} is not available");
    }

    pub async fn list_models(&self, kind: BackendKind) -> BackendResult<Vec<SubModel>> {
        match self.backends.get(&kind) {
            Some(backend) => backend.list_models().await,
            None => {
                Self::missing(kind);
                Ok(Vec::new())
            }
        }
    }

    pub async fn interrogate(
        &self,
        kind: BackendKind,
        request: &InterrogateRequest,
        image: &DynamicImage,
    ) -> BackendResult<Interrogation> {
        match self.backends.get(&kind) {
            Some(backend) => backend.interrogate(image, request).await,
            None => {
                Self::missing(kind);
                Ok(Interrogation::empty())
            }
        }
    }

    pub async fn unload(&self, kind: BackendKind) -> BackendResult<()> {
        match self.backends.get(&kind) {
            Some(backend) => backend.unload().await,
            None => {
                Self::missing(kind);
                Ok(())
            }
        }
    }

    /// Unload every registered backend. Failures are logged and do not stop
    /// the remaining unloads.
    pub async fn unload_all(&self) {
        for (kind, backend) in &self.backends {
            if let Err(e) = backend.unload().await {
                tracing::warn!("Failed to unload {kind}: {e}");
            }
        }
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.available_backend_names())
            .finish()
    }
}
