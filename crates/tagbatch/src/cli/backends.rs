//! The `tagbatch backends` command.

use clap::Args;
use serde::Serialize;
use tagbatch_core::{BackendKind, Config};

/// Arguments for the `backends` command.
#[derive(Args, Debug)]
pub struct BackendsArgs {
    /// Host API base URL (overrides config)
    #[arg(long, env = "TAGBATCH_HOST")]
    pub host: Option<String>,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct BackendListing {
    name: BackendKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    models: Vec<String>,
}

/// Execute the backends command.
pub async fn execute(args: BackendsArgs, config: &Config) -> anyhow::Result<()> {
    let registry = super::connect(&config.host, args.host.as_deref()).await;

    let mut listing = Vec::new();
    for kind in registry.available() {
        let models = if kind.is_multi_model() {
            match registry.list_models(kind).await {
                Ok(models) => models.into_iter().map(|m| m.display_name).collect(),
                Err(e) => {
                    tracing::warn!("Failed to list {kind} models: {e}");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };
        listing.push(BackendListing { name: kind, models });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    for entry in &listing {
        println!("{}", entry.name);
        for model in &entry.models {
            println!("    {model}");
        }
    }
    Ok(())
}
