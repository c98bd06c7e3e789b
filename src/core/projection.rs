//! Financial projection engine.
//!
//! A pure transform from a company's yearly records plus a market quote
//! into derived valuation metrics. No I/O, no state between calls; the
//! same inputs always produce the same output, so results can be
//! memoized freely by callers.

use crate::core::config::ValuationSettings;
use crate::core::quote::Quote;
use crate::core::record::{CompanyProfile, YearlyRecord};
use anyhow::anyhow;
use rust_decimal::{Decimal, prelude::*};
use rust_finprim::rate::cagr;
use std::collections::HashSet;
use std::fmt::Display;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("no yearly records provided")]
    EmptyInput,
    #[error("duplicate year {year} in records")]
    DuplicateYear { year: i32 },
    #[error("non-finite value in field `{field}` for year {year}")]
    InvalidField { year: i32, field: &'static str },
    #[error("shares outstanding must be positive, got {0}")]
    InvalidShares(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
    /// Margin of safety was not available, so no call can be made.
    Unknown,
}

impl Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Recommendation::Buy => "Buy",
            Recommendation::Hold => "Hold",
            Recommendation::Sell => "Sell",
            Recommendation::Unknown => "Unknown",
        };
        write!(f, "{label}")
    }
}

/// Metrics derived for a single year. `None` means "not available",
/// which is distinct from a computed zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMetrics {
    pub annual_profit: f64,
    /// Q4 not yet reported; the profit total is a running sum.
    pub partial_year: bool,
    pub eps: f64,
    pub estimated_growth: f64,
    pub estimated_eps: f64,
    /// May be negative in a shrinking-profit scenario; never clamped.
    pub projected_dividend: f64,
    pub yield_on_cost: Option<f64>,
    pub price_ceiling: Option<f64>,
    pub margin_of_safety: Option<f64>,
    pub yoy_growth: Option<f64>,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone)]
pub struct YearProjection {
    pub record: YearlyRecord,
    pub metrics: DerivedMetrics,
}

/// Derives the full metric set for every recorded year, ascending.
///
/// Records are sorted by year internally, so the result does not depend
/// on input order. The call either produces the complete output or
/// fails as a whole; an invalid quote (absent or non-positive price)
/// is not an error — quote-dependent metrics come back as `None`.
pub fn project(
    company: &CompanyProfile,
    records: &[YearlyRecord],
    quote: Option<&Quote>,
    settings: &ValuationSettings,
) -> Result<Vec<YearProjection>, ProjectionError> {
    validate(company, records)?;

    let mut ordered: Vec<YearlyRecord> = records.to_vec();
    ordered.sort_by_key(|r| r.year);

    let price = quote.filter(|q| q.is_valid()).map(|q| q.price);
    debug!(
        company = %company.normalized_ticker(),
        years = ordered.len(),
        quote_valid = price.is_some(),
        "projecting records"
    );

    let shares = company.shares_outstanding as f64;
    let mut out = Vec::with_capacity(ordered.len());

    for (idx, record) in ordered.iter().enumerate() {
        let annual_profit = record.annual_profit();
        let eps = annual_profit / shares;
        let estimated_growth = record
            .growth_override
            .or(record.cagr_5y)
            .unwrap_or_default();
        let estimated_eps = eps * (1.0 + estimated_growth);
        let projected_dividend =
            estimated_eps * record.payout_projected * (1.0 + record.dividend_adjustment);

        let yield_on_cost = price.map(|p| projected_dividend / p);

        // A company expected to cut its dividend to zero or below has
        // no positive fair-value ceiling under a dividend-discount
        // approach; that is a result, not an error.
        let price_ceiling = if settings.required_yield > 0.0 {
            if projected_dividend > 0.0 {
                Some(projected_dividend / settings.required_yield)
            } else {
                Some(0.0)
            }
        } else {
            None
        };

        let margin_of_safety = match (price_ceiling, price) {
            (Some(ceiling), Some(p)) if ceiling > 0.0 => Some((ceiling - p) / ceiling),
            _ => None,
        };

        let yoy_growth = idx.checked_sub(1).and_then(|prev_idx| {
            let prev = &ordered[prev_idx];
            if prev.dividend_prior_year == 0.0 {
                None
            } else {
                Some(
                    (record.dividend_prior_year - prev.dividend_prior_year)
                        / prev.dividend_prior_year,
                )
            }
        });

        let recommendation = match margin_of_safety {
            Some(m) if m >= settings.buy_threshold => Recommendation::Buy,
            Some(m) if m >= settings.sell_threshold => Recommendation::Hold,
            Some(_) => Recommendation::Sell,
            None => Recommendation::Unknown,
        };

        out.push(YearProjection {
            record: record.clone(),
            metrics: DerivedMetrics {
                annual_profit,
                partial_year: record.is_partial(),
                eps,
                estimated_growth,
                estimated_eps,
                projected_dividend,
                yield_on_cost,
                price_ceiling,
                margin_of_safety,
                yoy_growth,
                recommendation,
            },
        });
    }

    Ok(out)
}

/// Compound annual growth rate of annual profit between the first and
/// last complete recorded years. `None` when the window is shorter than
/// a year, an endpoint year is partial, or an endpoint profit is not
/// positive.
pub fn realized_profit_cagr(projections: &[YearProjection]) -> Option<f64> {
    let complete: Vec<&YearProjection> =
        projections.iter().filter(|p| !p.metrics.partial_year).collect();
    let first = complete.first()?;
    let last = complete.last()?;

    let years = last.record.year - first.record.year;
    if years < 1 {
        return None;
    }
    if first.metrics.annual_profit <= 0.0 || last.metrics.annual_profit <= 0.0 {
        return None;
    }

    let rate: anyhow::Result<f64> = (|| {
        let begin = Decimal::from_f64(first.metrics.annual_profit)
            .ok_or_else(|| anyhow!("Invalid beginning profit"))?;
        let end = Decimal::from_f64(last.metrics.annual_profit)
            .ok_or_else(|| anyhow!("Invalid ending profit"))?;
        let n_years = Decimal::from(years);
        cagr(begin, end, n_years)
            .to_f64()
            .ok_or_else(|| anyhow!("CAGR conversion failed"))
    })();

    match rate {
        Ok(r) => Some(r),
        Err(e) => {
            debug!("realized CAGR not computable: {e}");
            None
        }
    }
}

fn validate(company: &CompanyProfile, records: &[YearlyRecord]) -> Result<(), ProjectionError> {
    if records.is_empty() {
        return Err(ProjectionError::EmptyInput);
    }
    if company.shares_outstanding <= 0 {
        return Err(ProjectionError::InvalidShares(company.shares_outstanding));
    }

    let mut seen = HashSet::new();
    for record in records {
        if !seen.insert(record.year) {
            return Err(ProjectionError::DuplicateYear { year: record.year });
        }
        check_finite(record)?;
    }
    Ok(())
}

fn check_finite(record: &YearlyRecord) -> Result<(), ProjectionError> {
    let year = record.year;
    let fields: [(&'static str, Option<f64>); 9] = [
        ("quarterly_profit[1]", record.quarterly_profit[0]),
        ("quarterly_profit[2]", record.quarterly_profit[1]),
        ("quarterly_profit[3]", record.quarterly_profit[2]),
        ("quarterly_profit[4]", record.quarterly_profit[3]),
        ("dividend_prior_year", Some(record.dividend_prior_year)),
        ("payout_projected", Some(record.payout_projected)),
        ("dividend_adjustment", Some(record.dividend_adjustment)),
        ("cagr_5y", record.cagr_5y),
        ("growth_override", record.growth_override),
    ];
    for (field, value) in fields {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(ProjectionError::InvalidField { year, field });
            }
        }
    }
    Ok(())
}
