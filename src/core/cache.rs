use crate::core::quote::Quote;
use async_trait::async_trait;
use std::time::Duration;

/// Keyed quote storage with per-entry expiry. Entries past their TTL
/// behave as absent.
#[async_trait]
pub trait QuoteCache: Send + Sync {
    async fn get(&self, ticker: &str) -> Option<Quote>;
    async fn put(&self, ticker: &str, quote: Quote, ttl: Option<Duration>);
    async fn remove(&self, ticker: &str);
}
