//! Market quote abstractions

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A market quote anchoring the valuation of a company's records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    pub currency: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    /// Quote-dependent metrics are only computed from a strictly
    /// positive price.
    pub fn is_valid(&self) -> bool {
        self.price > 0.0
    }
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quote(&self, ticker: &str) -> Result<Quote>;
}
