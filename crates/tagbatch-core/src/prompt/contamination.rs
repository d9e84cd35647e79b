//! Tracks the interrogation text injected into a shared prompt.
//!
//! The host reuses one job object across the images of a batch run, so the
//! prompt still carries the previous image's interrogation when the next step
//! starts. The tracker remembers exactly what was injected so it can be removed
//! before new text goes in.

/// Contamination state for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContaminationTracker {
    /// Nothing injected, or the record was discarded
    #[default]
    Clean,

    /// The exact text injected by the last successful step
    Contaminated(String),
}

impl ContaminationTracker {
    pub fn new() -> Self {
        Self::Clean
    }

    /// Start a batch step. The first job of a run (`job_no <= 0`) discards the record.
    pub fn begin_step(&mut self, job_no: i64) {
        if job_no <= 0 {
            tracing::debug!(
                "New batch run, discarding contamination record: {:?}",
                self.injected()
            );
            self.reset();
        }
    }

    /// Remove the recorded text from `field`. Literal substring removal.
    pub fn decontaminate(&self, field: &str) -> String {
        match self {
            Self::Contaminated(text) if !text.is_empty() => field.replace(text.as_str(), ""),
            _ => field.to_string(),
        }
    }

    /// Remember `text` as the latest injection.
    pub fn record(&mut self, text: impl Into<String>) {
        let text = text.into();
        *self = if text.is_empty() {
            Self::Clean
        } else {
            Self::Contaminated(text)
        };
    }

    pub fn reset(&mut self) {
        *self = Self::Clean;
    }

    /// The recorded injection, if any.
    pub fn injected(&self) -> Option<&str> {
        match self {
            Self::Clean => None,
            Self::Contaminated(text) => Some(text),
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }
}
