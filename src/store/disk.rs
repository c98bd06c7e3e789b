use crate::core::cache::QuoteCache;
use crate::core::quote::Quote;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    quote: Quote,
    expires_at: Option<SystemTime>,
}

/// Quote cache persisted in a fjall partition, so a quote fetched just
/// before a restart still serves within its TTL.
pub struct DiskQuoteCache {
    _keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskQuoteCache {
    pub fn new(db_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(db_path)?;

        let keyspace = fjall::Config::new(db_path).open()?;
        let partition = keyspace.open_partition("quotes", PartitionCreateOptions::default())?;
        Ok(Self {
            _keyspace: keyspace,
            partition,
        })
    }
}

#[async_trait]
impl QuoteCache for DiskQuoteCache {
    async fn get(&self, ticker: &str) -> Option<Quote> {
        let res: Result<Option<Quote>> = (|| {
            if let Some(value) = self.partition.get(ticker)? {
                let entry: CacheEntry = serde_json::from_slice(&value)?;
                if let Some(expires_at) = entry.expires_at {
                    if SystemTime::now() > expires_at {
                        debug!("Cache entry expired for ticker: {}", ticker);
                        self.partition.remove(ticker)?;
                        return Ok(None);
                    }
                }
                debug!("Cache HIT for ticker: {}", ticker);
                return Ok(Some(entry.quote));
            }
            debug!("Cache MISS for ticker: {}", ticker);
            Ok(None)
        })();

        match res {
            Ok(val) => val,
            Err(e) => {
                debug!("DiskQuoteCache get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, ticker: &str, quote: Quote, ttl: Option<Duration>) {
        let res: Result<()> = (|| {
            let expires_at = ttl.map(|d| SystemTime::now() + d);
            let entry = CacheEntry { quote, expires_at };
            self.partition
                .insert(ticker, serde_json::to_vec(&entry)?)?;
            debug!("Cache PUT for ticker: {}", ticker);
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskQuoteCache put error: {}", e);
        }
    }

    async fn remove(&self, ticker: &str) {
        if let Err(e) = self.partition.remove(ticker) {
            debug!("DiskQuoteCache remove error: {}", e);
        }
    }
}
