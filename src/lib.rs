pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::cache::QuoteCache;
use crate::core::config::AppConfig;
use crate::providers::api_store::ApiRecordStore;
use crate::providers::caching::CachingQuoteProvider;
use crate::providers::yahoo::YahooQuoteProvider;
use crate::store::{DiskQuoteCache, MemoryQuoteCache};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub enum AppCommand {
    List,
    Summary { ticker: Option<String> },
    Refresh,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Dividend tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = ApiRecordStore::new(&config.api.base_url)?;

    let yahoo_base = config
        .providers
        .yahoo
        .as_ref()
        .map_or("https://query1.finance.yahoo.com", |p| &p.base_url);
    let yahoo = YahooQuoteProvider::new(yahoo_base);

    let cache = open_quote_cache(&config);
    let quote_provider = CachingQuoteProvider::new(
        yahoo,
        Arc::clone(&cache),
        Duration::from_secs(config.quote_ttl_secs),
    );

    match command {
        AppCommand::List => cli::list::run(&store).await,
        AppCommand::Summary { ticker } => {
            cli::summary::run(&store, &quote_provider, &config.valuation, ticker.as_deref()).await
        }
        AppCommand::Refresh => cli::refresh::run(&store, &quote_provider, cache.as_ref()).await,
    }
}

/// Opens the persistent quote cache, falling back to an in-memory one
/// when the data directory is unusable.
fn open_quote_cache(config: &AppConfig) -> Arc<dyn QuoteCache> {
    let disk = config
        .default_data_path()
        .and_then(|path| DiskQuoteCache::new(&path.join("quote-cache")));
    match disk {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            warn!("Could not open the on-disk quote cache, using memory only: {e}");
            Arc::new(MemoryQuoteCache::new())
        }
    }
}
