use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::quote::{Quote, QuoteProvider};

/// Tickers without an exchange suffix are treated as B3 listings.
fn yahoo_symbol(ticker: &str) -> String {
    if ticker.contains('.') {
        ticker.to_string()
    } else {
        format!("{ticker}.SA")
    }
}

pub struct YahooQuoteProvider {
    base_url: String,
}

impl YahooQuoteProvider {
    pub fn new(base_url: &str) -> Self {
        YahooQuoteProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooQuoteResponse {
    chart: QuoteChartResult,
}

#[derive(Deserialize, Debug)]
struct QuoteChartResult {
    result: Vec<QuoteChartItem>,
}

#[derive(Deserialize, Debug)]
struct QuoteChartItem {
    meta: QuoteChartMeta,
    timestamp: Option<Vec<i64>>,
}

#[derive(Deserialize, Debug)]
struct QuoteChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
    currency: Option<String>,
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    #[instrument(
        name = "YahooQuoteFetch",
        skip(self),
        fields(ticker = %ticker)
    )]
    async fn fetch_quote(&self, ticker: &str) -> Result<Quote> {
        let symbol = yahoo_symbol(ticker);
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=1d",
            self.base_url, symbol
        );
        debug!("Requesting quote from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("divtrack/0.2")
            .build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for ticker: {} URL: {}", e, ticker, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for ticker: {}",
                response.status(),
                ticker
            ));
        }

        let text = response.text().await?;
        let data: YahooQuoteResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", ticker, e))?;

        let item = data
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No quote data found for ticker: {}", ticker))?;

        let price = item.meta.regular_market_price;
        if price <= 0.0 {
            // A zero quote would masquerade as missing data downstream.
            return Err(anyhow!(
                "Non-positive market price {} for ticker: {}",
                price,
                ticker
            ));
        }

        let fetched_at = item
            .timestamp
            .as_ref()
            .and_then(|ts| ts.last())
            .and_then(|ts| Utc.timestamp_opt(*ts, 0).single())
            .unwrap_or_else(Utc::now);

        Ok(Quote {
            price,
            currency: item.meta.currency,
            fetched_at,
        })
    }
}
