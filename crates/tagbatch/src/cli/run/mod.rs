//! The `tagbatch run` command for batch interrogation.

mod batch;
mod setup;

use clap::{Args, ValueEnum};
use std::path::PathBuf;
use tagbatch_core::{BackendKind, Config};

use batch::run_batch;
use setup::{build_options, discover_images};

/// Where the interrogation lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Placement {
    Prepend,
    Append,
    Insert,
}

/// Field targeted by `--placement insert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    Prompt,
    Negative,
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Image file or directory to interrogate
    #[arg(required = true)]
    pub input: PathBuf,

    /// Starting prompt shared by every image
    #[arg(short, long, default_value = "")]
    pub prompt: String,

    /// Starting negative prompt
    #[arg(short, long, default_value = "")]
    pub negative_prompt: String,

    /// JSON-lines output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Backend to run, in order; repeatable (overrides config)
    #[arg(short, long)]
    pub backend: Vec<BackendKind>,

    /// Placement of the interrogation (overrides config)
    #[arg(long, value_enum)]
    pub placement: Option<Placement>,

    /// Segment index for `--placement insert`
    #[arg(long, default_value = "0")]
    pub insert_index: usize,

    /// Field for `--placement insert`
    #[arg(long, value_enum, default_value = "prompt")]
    pub insert_target: Target,

    /// Inject into the negative prompt instead
    #[arg(long)]
    pub reverse: bool,

    /// Interrogate even when `interrogation.enabled` is false in the config
    #[arg(long)]
    pub enable: bool,

    /// WD tagger model by display name; repeatable (overrides config)
    #[arg(long)]
    pub wd_model: Vec<String>,

    /// CLIP extension model; repeatable (overrides config)
    #[arg(long)]
    pub clip_model: Vec<String>,

    /// WD tag threshold (overrides config)
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Per-image prompt copies the job carries
    #[arg(long, default_value = "1")]
    pub batch_size: usize,

    /// Host API base URL (overrides config)
    #[arg(long, env = "TAGBATCH_HOST")]
    pub host: Option<String>,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            prompt: String::new(),
            negative_prompt: String::new(),
            output: None,
            backend: Vec::new(),
            placement: None,
            insert_index: 0,
            insert_target: Target::Prompt,
            reverse: false,
            enable: false,
            wd_model: Vec::new(),
            clip_model: Vec::new(),
            threshold: None,
            batch_size: 1,
            host: None,
        }
    }
}

/// Execute the run command.
pub async fn execute(args: RunArgs, config: Config) -> anyhow::Result<()> {
    let files = discover_images(&args.input);
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(());
    }
    tracing::info!("Found {} image(s) to interrogate", files.len());

    let options = build_options(&args, &config)?;
    let registry = super::connect(&config.host, args.host.as_deref()).await;
    run_batch(&args, options, registry, files).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_args_default_batch_size() {
        let args = RunArgs::default();
        assert_eq!(args.batch_size, 1);
        assert_eq!(args.insert_target, Target::Prompt);
    }

    #[test]
    fn run_args_default_overrides_are_empty() {
        let args = RunArgs::default();
        assert!(args.backend.is_empty());
        assert!(args.placement.is_none());
        assert!(args.threshold.is_none());
        assert!(args.output.is_none());
    }
}
