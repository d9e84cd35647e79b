//! Batch orchestration - one image's interrogation step, end to end.
//!
//! A step runs the selected backends in order, cleans and filters their
//! combined output, splices it into the job's prompt and records what was
//! injected so the next step can remove it again. Nothing in a step is fatal:
//! backend and resolution failures are logged and contribute nothing.

use image::DynamicImage;
use std::sync::Arc;

use crate::backend::{BackendKind, BackendRegistry, InterrogateRequest};
use crate::config::InterrogationConfig;
use crate::error::BackendError;
use crate::job::{GenerationJob, JobState};
use crate::prompt::composer::trim_separator_tail;
use crate::prompt::{compose, finalize_interrogation, target_field};
use crate::session::InterrogationSession;
use crate::text::{
    dedup_comma_list, filter_overlap, normalize_underscore,
    strip_punctuation_preserving_emoticons, ReplacePairSet,
};
use crate::types::{InsertTarget, Interrogation, Tag, TagSet};

pub const PARAM_RESULT: &str = "Img2img batch interrogation result";
pub const PARAM_WD_MODEL: &str = "Img2img batch WD model";
pub const PARAM_WD_THRESHOLD: &str = "Img2img batch WD threshold";
pub const PARAM_WD_RATINGS: &str = "Img2img batch WD Ratings";
pub const PARAM_CLIP_MODEL: &str = "Img2img batch CLIP model";
pub const PARAM_CLIP_MODE: &str = "Img2img batch CLIP mode";

/// Per-call inputs of one batch step, as supplied by the host.
#[derive(Debug, Clone)]
pub struct BatchStep {
    /// Index of this image within the host's batch
    pub batch_number: usize,

    /// Tokenized prompts the generator consumes; refreshed on positive writes
    pub batch_prompts: Vec<String>,

    /// Replaces the reverse-selected prompt field before interrogation
    pub prompt_override: Option<String>,

    /// Replaces the job's first init image before interrogation
    pub image_override: Option<DynamicImage>,

    /// When false, the job's prompts and image are restored after composing
    pub update_job: bool,
}

impl Default for BatchStep {
    fn default() -> Self {
        Self {
            batch_number: 0,
            batch_prompts: Vec::new(),
            prompt_override: None,
            image_override: None,
            update_job: true,
        }
    }
}

/// What a completed step produced.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// Composed text of the field that received the interrogation
    pub prompt: String,

    /// Finalized interrogation (empty when nothing was injected)
    pub interrogation: String,

    /// Field the interrogation went into
    pub target: InsertTarget,

    /// An interrupt cut the backend loop short
    pub interrupted: bool,
}

impl StepReport {
    /// Whether the step injected anything.
    pub fn injected(&self) -> bool {
        !self.interrogation.is_empty()
    }
}

/// Outcome of [`BatchInterrogator::process_batch`].
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Interrogation is off or no backend is selected
    Disabled,

    /// Not the first image of the host batch; the first image's result stands
    Reused,

    /// The job has no init image to interrogate
    NoImage,

    /// The step ran to composition
    Completed(StepReport),
}

enum Poll {
    Proceed,
    Skip,
    Interrupt,
}

/// Consume pending skip/interrupt requests before a backend or sub-model.
fn poll(state: &JobState, what: &str) -> Poll {
    if state.take_skipped() {
        tracing::info!("Job skipped, moving past {what}");
        return Poll::Skip;
    }
    if state.take_interrupted() {
        tracing::warn!("Job interrupted before {what}, ending interrogation");
        return Poll::Interrupt;
    }
    Poll::Proceed
}

/// Text selected from scored tags.
///
/// Tags strictly above the threshold are kept, then keep-tags (given with
/// spaces, matched with underscores) that the backend reported below it.
/// Ratings at or above the rating threshold are appended when enabled.
pub fn select_scored(tags: &[Tag], ratings: &[Tag], options: &InterrogationConfig) -> String {
    let mut set = TagSet {
        source: BackendKind::WdExt.display_name().to_string(),
        threshold: options.wd_threshold,
        tags: tags
            .iter()
            .filter(|t| t.confidence > options.wd_threshold)
            .cloned()
            .collect(),
    };

    for keep in options.wd_keep_tags.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let key = keep.replace(' ', "_");
        if let Some(tag) = tags.iter().find(|t| t.name == key) {
            if !set.contains(&tag.name) {
                set.tags.push(tag.clone());
            }
        }
    }
    if !options.exaggeration_mode {
        set.dedup();
    }
    tracing::debug!("{} kept {} tag(s) above {}", set.source, set.tags.len(), set.threshold);

    let mut parts: Vec<String> = set
        .tags
        .iter()
        .map(|t| {
            if options.wd_underscore_fix {
                normalize_underscore(&t.name)
            } else {
                t.name.clone()
            }
        })
        .collect();

    if options.wd_append_ratings {
        let qualifying: Vec<&Tag> = ratings
            .iter()
            .filter(|r| r.confidence >= options.wd_rating_threshold)
            .collect();
        if qualifying.is_empty() {
            tracing::debug!(
                "No rating reached {}, none appended",
                options.wd_rating_threshold
            );
        }
        parts.extend(qualifying.into_iter().map(|r| r.name.clone()));
    }

    parts.join(", ")
}

/// Cleanup chain over the accumulated interrogation, in fixed order.
pub fn post_process(
    interrogation: &str,
    prompt: &str,
    negative_prompt: &str,
    options: &InterrogationConfig,
) -> String {
    let mut text = interrogation.to_string();
    if !options.exaggeration_mode {
        text = dedup_comma_list(&text);
    }
    if options.use_custom_replace {
        let pairs = ReplacePairSet::parse(&options.custom_find, &options.custom_replace);
        tracing::debug!("Replacing: {pairs}");
        text = pairs.apply(&text);
    }
    if options.use_positive_filter {
        text = filter_overlap(&text, prompt);
    }
    if options.use_negative_filter {
        text = filter_overlap(&text, negative_prompt);
    }
    if options.use_custom_filter {
        text = filter_overlap(&text, &options.custom_filter);
    }
    if options.no_punctuation_mode {
        text = strip_punctuation_preserving_emoticons(&text);
    }
    text
}

/// Runs interrogation steps against a fixed backend registry.
pub struct BatchInterrogator {
    registry: Arc<BackendRegistry>,
}

impl BatchInterrogator {
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Run one interrogation step over `job`.
    ///
    /// Short-circuits without touching the job when disabled, when no backend
    /// is selected, for every image after the first of a host batch, and when
    /// there is no image.
    pub async fn process_batch(
        &self,
        session: &mut InterrogationSession,
        job: &mut GenerationJob,
        state: &JobState,
        step: &mut BatchStep,
        options: &InterrogationConfig,
    ) -> StepOutcome {
        if !options.enabled || options.backends.is_empty() {
            return StepOutcome::Disabled;
        }
        if step.batch_number > 0 {
            tracing::debug!("Batch image {} reuses the first interrogation", step.batch_number);
            return StepOutcome::Reused;
        }
        if step.image_override.is_none() && job.init_images.is_empty() {
            tracing::warn!("No init image, skipping interrogation");
            return StepOutcome::NoImage;
        }

        let original_prompt = job.prompt.clone();
        let original_negative = job.negative_prompt.clone();
        let original_image = job.init_images.first().cloned();

        if let Some(text) = step.prompt_override.take() {
            let field = if options.reverse_mode {
                InsertTarget::NegativePrompt
            } else {
                InsertTarget::Prompt
            };
            job.set_field(field, text);
        }
        if let Some(image) = step.image_override.take() {
            match job.init_images.first_mut() {
                Some(first) => *first = image,
                None => job.init_images.push(image),
            }
        }

        tracing::debug!(
            "Interrogation step: job {}/{}",
            state.job_no() + 1,
            state.job_count()
        );

        let target = target_field(&options.placement, options.reverse_mode);
        session.contamination.begin_step(state.job_no());
        let cleaned = session.contamination.decontaminate(job.field(target));
        job.set_field(target, cleaned);

        let image = match job.init_images.first() {
            Some(image) => DynamicImage::ImageRgb8(image.to_rgb8()),
            None => return StepOutcome::NoImage,
        };

        let (raw, ratings, interrupted) = self.run_backends(session, state, &image, options).await;

        let cleaned = post_process(&raw, &job.prompt, &job.negative_prompt, options);
        let report = if trim_separator_tail(&cleaned).trim().is_empty() {
            tracing::info!("Interrogation produced no text, nothing injected");
            session.contamination.reset();
            StepReport {
                prompt: job.field(target).to_string(),
                interrogation: String::new(),
                target,
                interrupted,
            }
        } else {
            let finalized = finalize_interrogation(&cleaned, options.weight());
            let composed = compose(
                &job.prompt,
                &job.negative_prompt,
                &finalized,
                &options.placement,
                options.reverse_mode,
            );
            composed.write_back(job, &mut step.batch_prompts);

            session.contamination.record(composed.injected.clone());

            if options.prompt_output {
                tracing::info!("[Prompt]: {}", composed.target_text());
            }
            StepReport {
                prompt: composed.target_text().to_string(),
                interrogation: finalized,
                target,
                interrupted,
            }
        };

        self.write_generation_params(job, &report, ratings.as_deref(), options);

        if !step.update_job {
            job.prompt = original_prompt;
            job.negative_prompt = original_negative;
            if let (Some(image), Some(first)) = (original_image, job.init_images.first_mut()) {
                *first = image;
            }
        }

        StepOutcome::Completed(report)
    }

    /// Run every selected backend and accumulate `result, ` per contribution.
    ///
    /// Returns the raw text, the last ratings reported, and whether an
    /// interrupt ended the loop.
    async fn run_backends(
        &self,
        session: &mut InterrogationSession,
        state: &JobState,
        image: &DynamicImage,
        options: &InterrogationConfig,
    ) -> (String, Option<Vec<Tag>>, bool) {
        let mut interrogation = String::new();
        let mut ratings = None;

        for &kind in &options.backends {
            match poll(state, kind.display_name()) {
                Poll::Proceed => {}
                Poll::Skip => continue,
                Poll::Interrupt => return (interrogation, ratings, true),
            }
            if !self.registry.is_registered(kind) {
                let missing = BackendError::Missing(kind.display_name().to_string());
                tracing::warn!("{missing}, excluded from this step");
                continue;
            }

            let requests: Vec<(String, Option<String>)> = match kind {
                BackendKind::ClipExt => options
                    .clip_ext_models
                    .iter()
                    .map(|model| (model.clone(), Some(model.clone())))
                    .collect(),
                BackendKind::WdExt => options
                    .wd_models
                    .iter()
                    .map(|display| (display.clone(), None))
                    .collect(),
                BackendKind::ClipNative | BackendKind::DeepbooruNative => {
                    vec![(kind.display_name().to_string(), None)]
                }
            };

            for (label, clip_model) in requests {
                if kind.is_multi_model() {
                    match poll(state, &label) {
                        Poll::Proceed => {}
                        Poll::Skip => continue,
                        Poll::Interrupt => return (interrogation, ratings, true),
                    }
                }

                let request = match kind {
                    BackendKind::WdExt => {
                        let Some(key) = self.resolve_wd_model(session, &label).await else {
                            continue;
                        };
                        // Keep-tags need the sub-threshold scores.
                        let threshold = if options.wd_keep_tags.trim().is_empty() {
                            options.wd_threshold
                        } else {
                            0.0
                        };
                        InterrogateRequest {
                            model: Some(key),
                            clip_mode: options.clip_ext_mode,
                            threshold,
                        }
                    }
                    _ => InterrogateRequest {
                        model: clip_model,
                        clip_mode: options.clip_ext_mode,
                        threshold: options.wd_threshold,
                    },
                };

                if let Some(text) = self
                    .interrogate_one(kind, &label, &request, image, state, options, &mut ratings)
                    .await
                {
                    if !text.is_empty() {
                        interrogation.push_str(&text);
                        interrogation.push_str(", ");
                    }
                }

                let unload = match kind {
                    BackendKind::ClipExt => options.unload_clip_after_use,
                    BackendKind::WdExt => options.unload_wd_after_use,
                    _ => false,
                };
                if unload {
                    if let Err(e) = self.registry.unload(kind).await {
                        tracing::warn!("Failed to unload {kind}: {e}");
                    }
                }
            }
        }

        (interrogation, ratings, false)
    }

    /// One backend call with the host's job counters preserved around it.
    #[allow(clippy::too_many_arguments)]
    async fn interrogate_one(
        &self,
        kind: BackendKind,
        label: &str,
        request: &InterrogateRequest,
        image: &DynamicImage,
        state: &JobState,
        options: &InterrogationConfig,
        ratings: &mut Option<Vec<Tag>>,
    ) -> Option<String> {
        let progress = state.progress();
        let result = self.registry.interrogate(kind, request, image).await;
        state.restore(progress);

        match result {
            Ok(Interrogation::Caption(text)) => {
                let text = text.trim().to_string();
                tracing::debug!("[{kind}] ({label}) result: {text}");
                Some(text)
            }
            Ok(Interrogation::Scored { tags, ratings: scored }) => {
                let text = select_scored(&tags, &scored, options);
                tracing::debug!("[{kind}] ({label}:{}) result: {text}", options.wd_threshold);
                tracing::debug!("[{kind}] ({label}) ratings: {scored:?}");
                *ratings = Some(scored);
                Some(text)
            }
            Err(e) => {
                tracing::error!("{kind} ({label}) failed: {e}");
                None
            }
        }
    }

    /// Map a WD display name to its key, refreshing the mapping when empty.
    async fn resolve_wd_model(
        &self,
        session: &mut InterrogationSession,
        display_name: &str,
    ) -> Option<String> {
        if session.wd_models.is_empty() {
            tracing::info!("WD model mapping is empty, refreshing");
            match self.registry.list_models(BackendKind::WdExt).await {
                Ok(models) => session.wd_models.refresh(&models),
                Err(e) => tracing::warn!("Failed to list WD models: {e}"),
            }
        }
        match session.wd_models.resolve(display_name) {
            Some(key) => {
                tracing::debug!("WD model '{display_name}' resolved to '{key}'");
                Some(key.to_string())
            }
            None => {
                let err = BackendError::UnresolvedModel {
                    backend: BackendKind::WdExt.display_name().to_string(),
                    display_name: display_name.to_string(),
                };
                tracing::warn!(
                    "{err}, skipping (available: {})",
                    session.wd_models.display_names().join(", ")
                );
                None
            }
        }
    }

    fn write_generation_params(
        &self,
        job: &mut GenerationJob,
        report: &StepReport,
        ratings: Option<&[Tag]>,
        options: &InterrogationConfig,
    ) {
        let result = trim_separator_tail(&report.interrogation).to_string();
        job.set_param(PARAM_RESULT, Some(result.into()));

        if self.registry.is_registered(BackendKind::WdExt) {
            let models = (!options.wd_models.is_empty()).then(|| options.wd_models.join(", ").into());
            job.set_param(PARAM_WD_MODEL, models);
            job.set_param(PARAM_WD_THRESHOLD, Some(options.wd_threshold.into()));
            let ratings = ratings.filter(|r| !r.is_empty()).map(|r| {
                r.iter()
                    .map(|t| (t.name.clone(), serde_json::Value::from(t.confidence)))
                    .collect::<serde_json::Map<_, _>>()
                    .into()
            });
            job.set_param(PARAM_WD_RATINGS, ratings);
        }

        if self.registry.is_registered(BackendKind::ClipExt) {
            let models = (!options.clip_ext_models.is_empty())
                .then(|| options.clip_ext_models.join(", ").into());
            job.set_param(PARAM_CLIP_MODEL, models);
            job.set_param(PARAM_CLIP_MODE, Some(options.clip_ext_mode.to_string().into()));
        }
    }
}
