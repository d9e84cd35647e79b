//! Option assembly and input discovery for `run`.

use std::path::{Path, PathBuf};
use tagbatch_core::config::InterrogationConfig;
use tagbatch_core::types::InsertTarget;
use tagbatch_core::{Config, PlacementPolicy, SettingsStore};
use walkdir::WalkDir;

use super::{Placement, RunArgs, Target};

const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Supported images at `path`, sorted for a deterministic batch order.
pub fn discover_images(path: &Path) -> Vec<PathBuf> {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    if expanded.is_file() {
        return if is_supported(&expanded) {
            vec![expanded]
        } else {
            vec![]
        };
    }

    let mut files: Vec<PathBuf> = WalkDir::new(&expanded)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && is_supported(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Fill list options left empty in the config from the persisted settings files.
fn fill_from_settings(options: &mut InterrogationConfig, store: &SettingsStore) {
    if options.custom_filter.trim().is_empty() {
        options.custom_filter = store.custom_filter();
    }
    if options.wd_keep_tags.trim().is_empty() {
        options.wd_keep_tags = store.keep_tags();
    }
    if options.custom_find.trim().is_empty() && options.custom_replace.trim().is_empty() {
        let (find, replace) = store.custom_replace();
        options.custom_find = find;
        options.custom_replace = replace;
    }
}

/// Interrogation options: config, then persisted lists, then CLI overrides.
pub fn build_options(args: &RunArgs, config: &Config) -> anyhow::Result<InterrogationConfig> {
    let mut options = config.interrogation.clone();
    fill_from_settings(&mut options, &SettingsStore::new(config.settings_dir()));

    if args.enable {
        options.enabled = true;
    }
    if !options.enabled {
        tracing::warn!(
            "Interrogation is disabled in the config, prompts pass through unchanged (use --enable)"
        );
    }
    if !args.backend.is_empty() {
        options.backends = args.backend.clone();
    }
    if let Some(placement) = args.placement {
        options.placement = match placement {
            Placement::Prepend => PlacementPolicy::Prepend,
            Placement::Append => PlacementPolicy::Append,
            Placement::Insert => PlacementPolicy::InsertAtIndex {
                target: match args.insert_target {
                    Target::Prompt => InsertTarget::Prompt,
                    Target::Negative => InsertTarget::NegativePrompt,
                },
                index: args.insert_index,
            },
        };
    }
    if args.reverse {
        options.reverse_mode = true;
    }
    if !args.wd_model.is_empty() {
        options.wd_models = args.wd_model.clone();
    }
    if !args.clip_model.is_empty() {
        options.clip_ext_models = args.clip_model.clone();
    }
    if let Some(threshold) = args.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!("--threshold must be between 0.0 and 1.0, got {threshold}");
        }
        options.wd_threshold = threshold;
    }
    if args.batch_size == 0 {
        anyhow::bail!("--batch-size must be > 0");
    }

    if options.backends.is_empty() {
        anyhow::bail!("No backend selected. Pass --backend or set interrogation.backends.");
    }
    Ok(options)
}
