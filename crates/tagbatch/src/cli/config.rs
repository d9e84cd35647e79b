//! The `tagbatch config` command: config file plus the settings directory it points at.

use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use tagbatch_core::settings::LIST_FILES;
use tagbatch_core::text::ReplacePairSet;
use tagbatch_core::{Config, SettingsStore};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration and the state of each list file
    Show,

    /// Print the config file path and the resolved settings directory
    Path,

    /// Write a default config and create the empty list files
    Init {
        /// Overwrite an existing config file (list files are never overwritten)
        #[arg(long)]
        force: bool,
    },

    /// Validate the config file and the find/replace list
    Check,
}

/// What `init` changed on disk.
#[derive(Debug, Default)]
struct InitReport {
    config_written: bool,
    created_lists: Vec<PathBuf>,
}

/// Write the default config unless one exists; `force` rewrites it.
fn write_default(config_path: &Path, force: bool) -> anyhow::Result<bool> {
    if config_path.exists() && !force {
        tracing::info!(
            "Keeping existing config at {} (pass --force to rewrite it)",
            config_path.display()
        );
        return Ok(false);
    }
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, Config::default().to_toml()?)?;
    Ok(true)
}

fn init_at(config_path: &Path, force: bool) -> anyhow::Result<InitReport> {
    let config_written = write_default(config_path, force)?;
    let config = Config::load_from(config_path)?;
    let store = SettingsStore::new(config.settings_dir());
    Ok(InitReport {
        config_written,
        created_lists: store.ensure_files()?,
    })
}

/// One line per list file: path and whether it holds anything.
fn list_status(store: &SettingsStore) -> Vec<String> {
    LIST_FILES
        .iter()
        .map(|file| {
            let path = store.path(file);
            let state = match std::fs::metadata(&path) {
                Ok(meta) if meta.len() == 0 => "empty",
                Ok(_) => "set",
                Err(_) => "missing",
            };
            format!("{} ({state})", path.display())
        })
        .collect()
}

/// Execute the config command.
pub fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            println!("{}", config.to_toml()?);
            println!("# settings_dir resolves to {}", config.settings_dir().display());
            for line in list_status(&SettingsStore::new(config.settings_dir())) {
                println!("#   {line}");
            }
        }

        ConfigCommand::Path => {
            let config = Config::load()?;
            println!("config:   {}", Config::default_path().display());
            println!("settings: {}", config.settings_dir().display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();
            let report = init_at(&path, force)?;
            if report.config_written {
                println!("Wrote default config to {}", path.display());
            }
            for created in &report.created_lists {
                println!("Created {}", created.display());
            }
            if !report.config_written && report.created_lists.is_empty() {
                println!("Nothing to do: config and list files already exist.");
            }
        }

        ConfigCommand::Check => {
            let path = Config::default_path();
            let config = if path.exists() {
                Config::load_from(&path)?
            } else {
                println!("No config file at {}, defaults apply", path.display());
                Config::default()
            };
            let store = SettingsStore::new(config.settings_dir());
            let (find, replace) = store.custom_replace();
            let pairs = ReplacePairSet::parse(&find, &replace);
            println!(
                "Config OK: {} backend(s) selected, {} replace pair(s)",
                config.interrogation.backends.len(),
                pairs.len()
            );
        }
    }

    Ok(())
}
