use super::ui;
use crate::core::cache::QuoteCache;
use crate::core::quote::{Quote, QuoteProvider};
use crate::core::record::{CompanyProfile, RecordStore};
use crate::providers::util::with_retry;
use anyhow::{Result, anyhow};
use comfy_table::Cell;
use futures::StreamExt;
use std::time::Duration;
use tracing::{info, warn};

/// How many quotes are refreshed concurrently.
const REFRESH_CONCURRENCY: usize = 4;
/// Hard deadline for a single quote fetch, including the retry.
const QUOTE_TIMEOUT: Duration = Duration::from_secs(10);
const RETRY_DELAY_MS: u64 = 500;

struct RefreshOutcome {
    company: CompanyProfile,
    result: Result<Quote>,
}

pub async fn run(
    store: &(dyn RecordStore + Send + Sync),
    quote_provider: &(dyn QuoteProvider + Send + Sync),
    cache: &(dyn QuoteCache + Send + Sync),
) -> Result<()> {
    let companies = store.list_companies().await?;
    if companies.is_empty() {
        println!("No companies registered in the record store.");
        return Ok(());
    }

    info!("Refreshing quotes for {} companies...", companies.len());
    let pb = ui::new_progress_bar(companies.len() as u64, true);
    pb.set_message("Refreshing quotes...");

    let outcomes: Vec<RefreshOutcome> =
        futures::stream::iter(companies.into_iter().map(|company| {
            let pb_clone = pb.clone();
            async move {
                // Drop the stale entry first so the fetch repopulates the cache.
                cache.remove(&company.ticker).await;
                let result = fetch_with_resilience(quote_provider, &company.ticker).await;
                pb_clone.inc(1);
                RefreshOutcome { company, result }
            }
        }))
        .buffer_unordered(REFRESH_CONCURRENCY)
        .collect()
        .await;
    pb.finish_and_clear();

    let mut outcomes = outcomes;
    outcomes.sort_by(|a, b| a.company.ticker.cmp(&b.company.ticker));

    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            warn!("Quote refresh failed for {}: {e}", outcome.company.ticker);
        }
    }

    display_outcomes(&outcomes);
    Ok(())
}

async fn fetch_with_resilience(
    provider: &(dyn QuoteProvider + Send + Sync),
    ticker: &str,
) -> Result<Quote> {
    with_retry(
        || async {
            tokio::time::timeout(QUOTE_TIMEOUT, provider.fetch_quote(ticker))
                .await
                .map_err(|_| anyhow!("quote fetch timed out after {QUOTE_TIMEOUT:?}"))?
        },
        1,
        RETRY_DELAY_MS,
    )
    .await
}

fn display_outcomes(outcomes: &[RefreshOutcome]) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Ticker"),
        ui::header_cell("Price"),
        ui::header_cell("Fetched"),
        ui::header_cell("Status"),
    ]);

    let mut refreshed = 0;
    for outcome in outcomes {
        match &outcome.result {
            Ok(quote) => {
                refreshed += 1;
                table.add_row(vec![
                    Cell::new(&outcome.company.ticker),
                    Cell::new(ui::format_money(quote.price, quote.currency.as_deref())),
                    Cell::new(quote.fetched_at.format("%Y-%m-%d %H:%M UTC").to_string()),
                    Cell::new("OK").fg(comfy_table::Color::Green),
                ]);
            }
            Err(e) => {
                table.add_row(vec![
                    Cell::new(&outcome.company.ticker),
                    ui::na_cell(true),
                    ui::na_cell(true),
                    Cell::new(e.to_string()).fg(comfy_table::Color::Red),
                ]);
            }
        }
    }

    println!("{table}");
    let summary = format!("Refreshed {refreshed} of {} quotes.", outcomes.len());
    if refreshed == outcomes.len() {
        println!("{}", ui::style_text(&summary, ui::StyleType::Good));
    } else {
        println!("{}", ui::style_text(&summary, ui::StyleType::Error));
    }
}
