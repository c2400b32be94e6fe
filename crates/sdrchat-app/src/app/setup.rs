use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use sdrchat_api::{normalize_base_url, HttpChatApi};
use sdrchat_storage::JsonFileStore;

use crate::cli::Cli;
use crate::config::ClientConfig;

/// Resolves the client configuration from parsed CLI arguments
pub fn setup_from_cli(cli: &Cli) -> Result<ClientConfig> {
    let api_base = normalize_base_url(&cli.api_base)
        .with_context(|| format!("Invalid --api-base '{}'", cli.api_base))?;

    let request_timeout = match cli.timeout_secs {
        Some(0) => anyhow::bail!("--timeout must be at least 1 second"),
        Some(secs) => Some(Duration::from_secs(secs)),
        None => None,
    };

    Ok(ClientConfig {
        api_base,
        store_path: cli.store.clone(),
        ordering: cli.ordering.into(),
        request_timeout,
        verbose: cli.verbose,
    })
}

pub fn open_store(config: &ClientConfig) -> Result<Arc<JsonFileStore>> {
    let store = JsonFileStore::open(&config.store_path).with_context(|| {
        format!("Failed to open store at {}", config.store_path.display())
    })?;
    log::debug!("Using store {}", config.store_path.display());
    Ok(Arc::new(store))
}

pub fn build_api(config: &ClientConfig) -> Result<HttpChatApi> {
    HttpChatApi::with_timeout(&config.api_base, config.request_timeout)
        .context("Failed to create chat service client")
}
