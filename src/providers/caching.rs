use crate::core::cache::QuoteCache;
use crate::core::quote::{Quote, QuoteProvider};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Wraps a quote provider with TTL-bounded memoization.
///
/// Cached quotes keep their original `fetched_at`, so a projection run
/// against a memoized quote is identical to the run that populated it.
pub struct CachingQuoteProvider<T: QuoteProvider> {
    inner: T,
    cache: Arc<dyn QuoteCache>,
    ttl: Duration,
}

impl<T: QuoteProvider> CachingQuoteProvider<T> {
    pub fn new(inner: T, cache: Arc<dyn QuoteCache>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait]
impl<T: QuoteProvider + Send + Sync> QuoteProvider for CachingQuoteProvider<T> {
    async fn fetch_quote(&self, ticker: &str) -> Result<Quote> {
        if let Some(cached) = self.cache.get(ticker).await {
            debug!("Cache hit for quote: {}", ticker);
            return Ok(cached);
        }
        debug!("Cache miss for quote: {}", ticker);
        let quote = self.inner.fetch_quote(ticker).await?;
        self.cache
            .put(ticker, quote.clone(), Some(self.ttl))
            .await;
        Ok(quote)
    }
}
