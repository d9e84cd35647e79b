//! Display-name ↔ key mapping for multi-model backends.

use std::collections::BTreeMap;

use crate::types::SubModel;

/// Bidirectional map between sub-model display names and backend keys.
#[derive(Debug, Clone, Default)]
pub struct ModelKeyMap {
    by_display: BTreeMap<String, String>,
    by_key: BTreeMap<String, String>,
}

impl ModelKeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the map from a backend's model listing.
    pub fn refresh(&mut self, models: &[SubModel]) {
        self.by_display.clear();
        self.by_key.clear();
        for model in models {
            self.by_display
                .insert(model.display_name.clone(), model.key.clone());
            self.by_key
                .insert(model.key.clone(), model.display_name.clone());
        }
        if models.is_empty() {
            tracing::warn!("No sub-models reported, model mapping is empty");
        } else {
            tracing::info!("Mapped {} sub-model(s)", models.len());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Display names, sorted.
    pub fn display_names(&self) -> Vec<&str> {
        self.by_display.keys().map(String::as_str).collect()
    }

    pub fn display_for(&self, key: &str) -> Option<&str> {
        self.by_key.get(key).map(String::as_str)
    }

    /// Resolve a user-facing name to a backend key.
    ///
    /// Tries the exact display name, then the name itself as a known key, then
    /// a case-insensitive match against display names and keys.
    pub fn resolve(&self, display_name: &str) -> Option<&str> {
        if let Some(key) = self.by_display.get(display_name) {
            return Some(key.as_str());
        }
        if let Some((key, _)) = self.by_key.get_key_value(display_name) {
            return Some(key.as_str());
        }

        let lowered = display_name.to_lowercase();
        self.by_display
            .iter()
            .find(|(display, _)| display.to_lowercase() == lowered)
            .map(|(_, key)| key.as_str())
            .or_else(|| {
                self.by_key
                    .keys()
                    .find(|key| key.to_lowercase() == lowered)
                    .map(String::as_str)
            })
    }
}
