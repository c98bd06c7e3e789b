//! Company and yearly-record types, plus the record store abstraction

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A company registered in the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub id: u64,
    pub name: String,
    pub ticker: String,
    pub shares_outstanding: i64,
}

impl CompanyProfile {
    /// Tickers are compared and displayed uppercase regardless of how
    /// the store returns them.
    pub fn normalized_ticker(&self) -> String {
        self.ticker.trim().to_uppercase()
    }
}

/// Raw per-year inputs for one company. Quarterly profits are `None`
/// until reported; a year missing Q4 is a partial year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlyRecord {
    pub year: i32,
    pub quarterly_profit: [Option<f64>; 4],
    /// Dividend actually paid per share, attributed to the prior
    /// fiscal year's profit.
    pub dividend_prior_year: f64,
    /// Expected share of profit paid out going forward.
    pub payout_projected: f64,
    /// One-off signed correction applied to the projected dividend.
    #[serde(default)]
    pub dividend_adjustment: f64,
    #[serde(default)]
    pub adjustment_reason: Option<String>,
    /// Externally supplied 5-year profit CAGR, the default growth input.
    #[serde(default)]
    pub cagr_5y: Option<f64>,
    /// Explicit growth estimate; wins over `cagr_5y` when present.
    #[serde(default)]
    pub growth_override: Option<f64>,
    #[serde(default)]
    pub analysis_type: Option<String>,
    #[serde(default)]
    pub advantages: Option<String>,
    #[serde(default)]
    pub disadvantages: Option<String>,
}

impl YearlyRecord {
    /// Sum of the quarters reported so far. Partial totals are legal.
    pub fn annual_profit(&self) -> f64 {
        self.quarterly_profit.iter().flatten().sum()
    }

    /// True until the fourth quarter is reported.
    pub fn is_partial(&self) -> bool {
        self.quarterly_profit[3].is_none()
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_companies(&self) -> Result<Vec<CompanyProfile>>;
    async fn list_years(&self, company_id: u64) -> Result<Vec<YearlyRecord>>;
    /// Remote valuation settings, if the store exposes any.
    async fn get_settings(&self) -> Result<Option<crate::core::config::ValuationSettings>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(quarters: [Option<f64>; 4]) -> YearlyRecord {
        YearlyRecord {
            year: 2024,
            quarterly_profit: quarters,
            dividend_prior_year: 0.0,
            payout_projected: 0.5,
            dividend_adjustment: 0.0,
            adjustment_reason: None,
            cagr_5y: None,
            growth_override: None,
            analysis_type: None,
            advantages: None,
            disadvantages: None,
        }
    }

    #[test]
    fn annual_profit_sums_reported_quarters() {
        let r = record([Some(100.0), Some(200.0), None, None]);
        assert_eq!(r.annual_profit(), 300.0);
        assert!(r.is_partial());
    }

    #[test]
    fn full_year_is_not_partial() {
        let r = record([Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(r.annual_profit(), 10.0);
        assert!(!r.is_partial());
    }

    #[test]
    fn ticker_is_uppercased() {
        let company = CompanyProfile {
            id: 1,
            name: "Petrobras".to_string(),
            ticker: " petr4 ".to_string(),
            shares_outstanding: 1000,
        };
        assert_eq!(company.normalized_ticker(), "PETR4");
    }
}
