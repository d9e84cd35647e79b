//! The host's generation job and its polled progress state.
//!
//! Both are owned by the host. The orchestrator writes prompt fields on the
//! job and polls the skip/interrupt flags on [`JobState`] between backend calls.

use image::DynamicImage;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use crate::types::InsertTarget;

/// Mutable prompt fields and inputs of one image-to-image job.
#[derive(Debug, Clone, Default)]
pub struct GenerationJob {
    pub prompt: String,
    pub negative_prompt: String,
    /// Per-image prompts recorded with the outputs
    pub all_prompts: Vec<String>,
    pub all_negative_prompts: Vec<String>,
    pub init_images: Vec<DynamicImage>,
    /// Key/value pairs written into the generation info text
    pub extra_generation_params: BTreeMap<String, serde_json::Value>,
}

impl GenerationJob {
    /// Create a job whose per-image prompt lists have `batch_size` entries.
    pub fn new(
        prompt: impl Into<String>,
        negative_prompt: impl Into<String>,
        batch_size: usize,
    ) -> Self {
        let prompt = prompt.into();
        let negative_prompt = negative_prompt.into();
        Self {
            all_prompts: vec![prompt.clone(); batch_size],
            all_negative_prompts: vec![negative_prompt.clone(); batch_size],
            prompt,
            negative_prompt,
            init_images: Vec::new(),
            extra_generation_params: BTreeMap::new(),
        }
    }

    pub fn field(&self, target: InsertTarget) -> &str {
        match target {
            InsertTarget::Prompt => &self.prompt,
            InsertTarget::NegativePrompt => &self.negative_prompt,
        }
    }

    pub fn set_field(&mut self, target: InsertTarget, value: String) {
        match target {
            InsertTarget::Prompt => self.prompt = value,
            InsertTarget::NegativePrompt => self.negative_prompt = value,
        }
    }

    /// Set (or clear, with `None`) one generation-info entry.
    pub fn set_param(&mut self, key: &str, value: Option<serde_json::Value>) {
        match value {
            Some(value) => {
                self.extra_generation_params.insert(key.to_string(), value);
            }
            None => {
                self.extra_generation_params.remove(key);
            }
        }
    }
}

/// Snapshot of the host's job counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobProgress {
    pub job_no: i64,
    pub job_count: i64,
}

/// Host progress state polled between backend calls.
///
/// Flags are atomics so a signal handler or UI thread holding an `Arc` can
/// set them while a step is running.
#[derive(Debug, Default)]
pub struct JobState {
    skipped: AtomicBool,
    interrupted: AtomicBool,
    job_no: AtomicI64,
    job_count: AtomicI64,
}

impl JobState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the current backend be skipped.
    pub fn skip(&self) {
        self.skipped.store(true, Ordering::SeqCst);
    }

    /// Request that the current step stop polling further backends.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    /// Consume a pending skip. Returns true at most once per `skip()`.
    pub fn take_skipped(&self) -> bool {
        self.skipped.swap(false, Ordering::SeqCst)
    }

    /// Consume a pending interrupt. Returns true at most once per `interrupt()`.
    pub fn take_interrupted(&self) -> bool {
        self.interrupted.swap(false, Ordering::SeqCst)
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.load(Ordering::SeqCst)
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    pub fn job_no(&self) -> i64 {
        self.job_no.load(Ordering::SeqCst)
    }

    pub fn job_count(&self) -> i64 {
        self.job_count.load(Ordering::SeqCst)
    }

    pub fn set_job(&self, job_no: i64, job_count: i64) {
        self.job_no.store(job_no, Ordering::SeqCst);
        self.job_count.store(job_count, Ordering::SeqCst);
    }

    pub fn progress(&self) -> JobProgress {
        JobProgress {
            job_no: self.job_no(),
            job_count: self.job_count(),
        }
    }

    pub fn restore(&self, progress: JobProgress) {
        self.set_job(progress.job_no, progress.job_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_consumed_once() {
        let state = JobState::new();
        state.skip();
        assert!(state.take_skipped());
        assert!(!state.take_skipped());
        assert!(!state.is_skipped());
    }

    #[test]
    fn test_interrupt_consumed_once() {
        let state = JobState::new();
        state.interrupt();
        assert!(state.is_interrupted());
        assert!(state.take_interrupted());
        assert!(!state.take_interrupted());
    }

    #[test]
    fn test_progress_restore() {
        let state = JobState::new();
        state.set_job(3, 10);
        let snapshot = state.progress();
        state.set_job(0, 1);
        state.restore(snapshot);
        assert_eq!(state.job_no(), 3);
        assert_eq!(state.job_count(), 10);
    }

    #[test]
    fn test_job_new_fills_lists() {
        let job = GenerationJob::new("solo", "blurry", 2);
        assert_eq!(job.all_prompts, vec!["solo".to_string(), "solo".to_string()]);
        assert_eq!(job.all_negative_prompts.len(), 2);
        assert_eq!(job.field(InsertTarget::NegativePrompt), "blurry");
    }

    #[test]
    fn test_set_param_none_removes() {
        let mut job = GenerationJob::default();
        job.set_param("k", Some(serde_json::json!(1)));
        assert!(job.extra_generation_params.contains_key("k"));
        job.set_param("k", None);
        assert!(job.extra_generation_params.is_empty());
    }
}
