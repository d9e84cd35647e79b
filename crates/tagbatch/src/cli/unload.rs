//! The `tagbatch unload` command.

use clap::Args;
use tagbatch_core::{BackendKind, Config};

/// Arguments for the `unload` command.
#[derive(Args, Debug)]
pub struct UnloadArgs {
    /// Backend to unload (all registered backends when omitted)
    #[arg(long)]
    pub backend: Option<BackendKind>,

    /// Host API base URL (overrides config)
    #[arg(long, env = "TAGBATCH_HOST")]
    pub host: Option<String>,
}

/// Execute the unload command.
pub async fn execute(args: UnloadArgs, config: &Config) -> anyhow::Result<()> {
    let registry = super::connect(&config.host, args.host.as_deref()).await;

    match args.backend {
        Some(kind) => {
            registry.unload(kind).await?;
            println!("Unloaded {kind}");
        }
        None => {
            registry.unload_all().await;
            println!(
                "Unloaded: {}",
                registry.available_backend_names().join(", ")
            );
        }
    }
    Ok(())
}
