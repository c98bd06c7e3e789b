//! HTTP client for the record store REST API.
//!
//! The store owns all raw inputs; this client never mutates anything,
//! it only reads companies, yearly records and valuation settings.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, instrument};

use crate::core::config::ValuationSettings;
use crate::core::record::{CompanyProfile, RecordStore, YearlyRecord};

pub struct ApiRecordStore {
    base_url: String,
    client: reqwest::Client,
}

impl ApiRecordStore {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("divtrack/0.2")
            .build()?;
        Ok(ApiRecordStore {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Requesting record store data from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Record store unavailable: {} for URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Record store error: HTTP {} for {}",
                response.status(),
                endpoint
            ));
        }

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse record store response for {}: {}", endpoint, e))
    }
}

#[async_trait]
impl RecordStore for ApiRecordStore {
    #[instrument(name = "ListCompanies", skip(self))]
    async fn list_companies(&self) -> Result<Vec<CompanyProfile>> {
        let mut companies: Vec<CompanyProfile> = self.get_json("/companies").await?;
        for company in &mut companies {
            company.ticker = company.normalized_ticker();
        }
        Ok(companies)
    }

    #[instrument(name = "ListYears", skip(self))]
    async fn list_years(&self, company_id: u64) -> Result<Vec<YearlyRecord>> {
        self.get_json(&format!("/companies/{company_id}/records"))
            .await
    }

    /// `None` when the store exposes no `/config` endpoint; local
    /// configuration then applies.
    async fn get_settings(&self) -> Result<Option<ValuationSettings>> {
        let url = format!("{}/config", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Record store unavailable: {} for URL: {}", e, url))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Record store has no /config endpoint, using local settings");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow!(
                "Record store error: HTTP {} for /config",
                response.status()
            ));
        }

        let settings: ValuationSettings = response.json().await?;
        Ok(Some(settings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_companies_normalizes_tickers() {
        let mock_server = MockServer::start().await;
        let body = r#"[
            {"id": 1, "name": "Petrobras", "ticker": "petr4", "shares_outstanding": 13044496000},
            {"id": 2, "name": "Itau", "ticker": "ITUB4", "shares_outstanding": 9804135348}
        ]"#;
        Mock::given(method("GET"))
            .and(path("/companies"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let store = ApiRecordStore::new(&mock_server.uri()).unwrap();
        let companies = store.list_companies().await.unwrap();

        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0].ticker, "PETR4");
        assert_eq!(companies[1].shares_outstanding, 9_804_135_348);
    }

    #[tokio::test]
    async fn test_list_years() {
        let mock_server = MockServer::start().await;
        let body = r#"[
            {
                "year": 2024,
                "quarterly_profit": [1000.0, 1200.0, null, null],
                "dividend_prior_year": 2.5,
                "payout_projected": 0.5,
                "dividend_adjustment": -0.1,
                "adjustment_reason": "one-off asset sale",
                "cagr_5y": 0.07
            }
        ]"#;
        Mock::given(method("GET"))
            .and(path("/companies/1/records"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let store = ApiRecordStore::new(&mock_server.uri()).unwrap();
        let records = store.list_years(1).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, 2024);
        assert_eq!(records[0].annual_profit(), 2200.0);
        assert!(records[0].is_partial());
        assert_eq!(records[0].cagr_5y, Some(0.07));
        assert!(records[0].growth_override.is_none());
    }

    #[tokio::test]
    async fn test_get_settings_present() {
        let mock_server = MockServer::start().await;
        let body = r#"{"required_yield": 0.06, "buy_threshold": 0.25, "sell_threshold": 0.05}"#;
        Mock::given(method("GET"))
            .and(path("/config"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        let store = ApiRecordStore::new(&mock_server.uri()).unwrap();
        let settings = store.get_settings().await.unwrap().unwrap();
        assert_eq!(settings.required_yield, 0.06);
        assert_eq!(settings.buy_threshold, 0.25);
        assert_eq!(settings.sell_threshold, 0.05);
    }

    #[tokio::test]
    async fn test_get_settings_missing_endpoint() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/config"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let store = ApiRecordStore::new(&mock_server.uri()).unwrap();
        assert!(store.get_settings().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upstream_error_is_propagated() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/companies"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let store = ApiRecordStore::new(&mock_server.uri()).unwrap();
        let result = store.list_companies().await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Record store error: HTTP 503 Service Unavailable for /companies"
        );
    }

    #[tokio::test]
    async fn test_malformed_records_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/companies/7/records"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"not": "a list"}"#))
            .mount(&mock_server)
            .await;

        let store = ApiRecordStore::new(&mock_server.uri()).unwrap();
        let result = store.list_years(7).await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse record store response for /companies/7/records")
        );
    }
}
