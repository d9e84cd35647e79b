//! State carried from one batch step to the next.

use crate::backend::ModelKeyMap;
use crate::prompt::ContaminationTracker;

/// Per-run interrogation state.
///
/// One session spans a batch run; the host reuses its job object across
/// images, so the contamination record must outlive a single step.
#[derive(Debug, Clone, Default)]
pub struct InterrogationSession {
    /// What the last step injected into the shared prompt
    pub contamination: ContaminationTracker,

    /// WD tagger display-name to key mapping, refreshed lazily
    pub wd_models: ModelKeyMap,
}

impl InterrogationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the contamination record. The model mapping is kept.
    pub fn reset(&mut self) {
        self.contamination.reset();
    }
}
