use crate::core::cache::QuoteCache;
use crate::core::quote::Quote;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CacheValue {
    quote: Quote,
    expires_at: Option<Instant>,
}

/// In-memory quote cache with per-entry expiry.
pub struct MemoryQuoteCache {
    inner: Arc<Mutex<HashMap<String, CacheValue>>>,
}

impl MemoryQuoteCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for MemoryQuoteCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteCache for MemoryQuoteCache {
    async fn get(&self, ticker: &str) -> Option<Quote> {
        let cache = self.inner.lock().await;
        if let Some(entry) = cache.get(ticker) {
            if let Some(expiry) = entry.expires_at {
                if expiry < Instant::now() {
                    debug!("Cache entry expired for ticker: {}", ticker);
                    return None;
                }
            }
            debug!("Cache HIT for ticker: {}", ticker);
            return Some(entry.quote.clone());
        }
        debug!("Cache MISS for ticker: {}", ticker);
        None
    }

    async fn put(&self, ticker: &str, quote: Quote, ttl: Option<Duration>) {
        let expires_at = ttl.map(|duration| Instant::now() + duration);
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for ticker: {}", ticker);
        cache.insert(ticker.to_string(), CacheValue { quote, expires_at });
    }

    async fn remove(&self, ticker: &str) {
        let mut cache = self.inner.lock().await;
        cache.remove(ticker);
        debug!("Cache REMOVE for ticker: {}", ticker);
    }
}
