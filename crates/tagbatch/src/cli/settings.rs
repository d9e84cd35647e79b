//! The `tagbatch settings` command for the persisted user lists.

use clap::{Args, Subcommand, ValueEnum};
use tagbatch_core::settings::optimize;
use tagbatch_core::text::ReplacePairSet;
use tagbatch_core::{Config, SettingsStore};

/// Arguments for the `settings` command.
#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

/// Which persisted list to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    /// Tags removed from every interrogation
    Filter,
    /// WD tags kept regardless of threshold
    KeepTags,
}

/// Subcommands for the persisted lists.
#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Display every list and the parsed replace pairs
    Show,

    /// Show the settings directory
    Path,

    /// Overwrite a list
    Save {
        #[arg(value_enum)]
        list: ListKind,
        /// Comma-separated tags
        value: String,
    },

    /// Overwrite the find/replace lists
    SaveReplace {
        /// Comma-separated terms to find
        find: String,
        /// Comma-separated replacements, parallel to FIND
        replace: String,
    },

    /// Trim, drop empties and deduplicate a list in place
    Optimize {
        #[arg(value_enum)]
        list: ListKind,
    },
}

fn read(store: &SettingsStore, list: ListKind) -> String {
    match list {
        ListKind::Filter => store.custom_filter(),
        ListKind::KeepTags => store.keep_tags(),
    }
}

fn save(store: &SettingsStore, list: ListKind, value: &str) -> bool {
    match list {
        ListKind::Filter => store.save_custom_filter(value),
        ListKind::KeepTags => store.save_keep_tags(value),
    }
}

/// Execute the settings command.
pub fn execute(args: SettingsArgs, config: &Config) -> anyhow::Result<()> {
    let store = SettingsStore::new(config.settings_dir());

    match args.command {
        SettingsCommand::Show => {
            let (find, replace) = store.custom_replace();
            println!("custom filter: {}", store.custom_filter());
            println!("keep tags:     {}", store.keep_tags());
            println!("find:          {find}");
            println!("replace:       {replace}");
            println!("pairs:         {}", ReplacePairSet::parse(&find, &replace));
        }

        SettingsCommand::Path => {
            println!("{}", store.dir().display());
        }

        SettingsCommand::Save { list, value } => {
            if !save(&store, list, &value) {
                anyhow::bail!("Failed to save {list:?} to {}", store.dir().display());
            }
        }

        SettingsCommand::SaveReplace { find, replace } => {
            let pairs = ReplacePairSet::parse(&find, &replace);
            if !store.save_custom_replace(&find, &replace) {
                anyhow::bail!("Failed to save replace lists to {}", store.dir().display());
            }
            println!("Saved {} pair(s): {pairs}", pairs.len());
        }

        SettingsCommand::Optimize { list } => {
            let optimized = optimize(&read(&store, list));
            if !save(&store, list, &optimized) {
                anyhow::bail!("Failed to save {list:?} to {}", store.dir().display());
            }
            println!("{optimized}");
        }
    }

    Ok(())
}
