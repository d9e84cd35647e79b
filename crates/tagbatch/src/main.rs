//! tagbatch CLI - batch image interrogation with prompt injection.
//!
//! Interrogates images through the host web UI's tagging backends and splices
//! the cleaned result into a generation prompt, the way an image-to-image
//! batch run would.
//!
//! # Usage
//!
//! ```bash
//! # Interrogate a directory, one JSON line per image
//! tagbatch run ./inputs --prompt "masterpiece" --backend deepbooru --backend wd
//!
//! # See which backends and sub-models the host offers
//! tagbatch backends
//!
//! # Preview where an insertion would land
//! tagbatch preview "masterpiece, (red hair:1.2), <lora:foo:1>" --index 1
//!
//! # View configuration
//! tagbatch config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// tagbatch - batch image interrogation with prompt injection.
#[derive(Parser, Debug)]
#[command(name = "tagbatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Interrogate images and inject the result into a prompt
    Run(cli::run::RunArgs),

    /// List available backends and their sub-models
    Backends(cli::backends::BackendsArgs),

    /// Unload backend models from the host
    Unload(cli::unload::UnloadArgs),

    /// Preview where an insertion lands in a prompt
    Preview(cli::preview::PreviewArgs),

    /// View and edit the persisted filter, keep-tags and replace lists
    Settings(cli::settings::SettingsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match tagbatch_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `tagbatch config path`."
            );
            tagbatch_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("tagbatch v{}", tagbatch_core::VERSION);

    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config).await,
        Commands::Backends(args) => cli::backends::execute(args, &config).await,
        Commands::Unload(args) => cli::unload::execute(args, &config).await,
        Commands::Preview(args) => cli::preview::execute(args),
        Commands::Settings(args) => cli::settings::execute(args, &config),
        Commands::Config(args) => cli::config::execute(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run_with_repeated_backends() {
        let cli = Cli::try_parse_from([
            "tagbatch", "run", "./inputs", "--backend", "deepbooru", "--backend", "WD (EXT)", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.backend.len(), 2);
    }

    #[test]
    fn test_cli_rejects_unknown_backend() {
        assert!(Cli::try_parse_from(["tagbatch", "run", ".", "--backend", "blip"]).is_err());
    }
}
