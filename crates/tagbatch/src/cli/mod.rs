//! Command handlers.

pub mod backends;
pub mod config;
pub mod preview;
pub mod run;
pub mod settings;
pub mod unload;

use tagbatch_core::backend::{discover, HostClient};
use tagbatch_core::config::HostConfig;
use tagbatch_core::BackendRegistry;

/// Probe the host and register the backends it offers.
pub(crate) async fn connect(host: &HostConfig, url_override: Option<&str>) -> BackendRegistry {
    let mut host = host.clone();
    if let Some(url) = url_override {
        host.url = url.to_string();
    }
    tracing::debug!("Connecting to host at {}", host.url);
    discover(HostClient::new(&host)).await
}
