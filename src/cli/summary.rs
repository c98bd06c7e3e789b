use super::ui;
use crate::core::config::ValuationSettings;
use crate::core::projection::{self, YearProjection};
use crate::core::quote::{Quote, QuoteProvider};
use crate::core::record::{CompanyProfile, RecordStore, YearlyRecord};
use anyhow::{Result, bail};
use comfy_table::{Cell, CellAlignment};
use futures::StreamExt;
use tracing::{debug, warn};

/// How many companies are fetched concurrently.
const FETCH_CONCURRENCY: usize = 4;

struct CompanyReport {
    company: CompanyProfile,
    records: Result<Vec<YearlyRecord>>,
    quote: Result<Quote>,
}

pub async fn run(
    store: &(dyn RecordStore + Send + Sync),
    quote_provider: &(dyn QuoteProvider + Send + Sync),
    local_settings: &ValuationSettings,
    ticker: Option<&str>,
) -> Result<()> {
    let mut companies = store.list_companies().await?;

    if let Some(wanted) = ticker {
        let wanted = wanted.trim().to_uppercase();
        companies.retain(|c| c.ticker == wanted);
        if companies.is_empty() {
            bail!("No company with ticker {wanted} in the record store");
        }
    }

    if companies.is_empty() {
        println!("No companies registered in the record store.");
        return Ok(());
    }

    // Remote settings win over the local config when the store has them.
    let settings = match store.get_settings().await {
        Ok(Some(remote)) => {
            debug!(?remote, "Using valuation settings from the record store");
            remote
        }
        Ok(None) => *local_settings,
        Err(e) => {
            warn!("Could not fetch remote valuation settings: {e}");
            *local_settings
        }
    };

    let pb = ui::new_progress_bar(companies.len() as u64, true);
    pb.set_message("Fetching records and quotes...");

    let reports: Vec<CompanyReport> = futures::stream::iter(companies.into_iter().map(|company| {
        let pb_clone = pb.clone();
        async move {
            let records = store.list_years(company.id).await;
            let quote = quote_provider.fetch_quote(&company.ticker).await;
            pb_clone.inc(1);
            CompanyReport {
                company,
                records,
                quote,
            }
        }
    }))
    .buffer_unordered(FETCH_CONCURRENCY)
    .collect()
    .await;
    pb.finish_and_clear();

    let mut reports = reports;
    reports.sort_by(|a, b| a.company.ticker.cmp(&b.company.ticker));

    let num_reports = reports.len();
    for (i, report) in reports.iter().enumerate() {
        println!("{}", render_report(report, &settings));
        if i < num_reports - 1 {
            ui::print_separator();
        }
    }

    Ok(())
}

fn render_report(report: &CompanyReport, settings: &ValuationSettings) -> String {
    let company = &report.company;
    let mut output = format!(
        "Company: {} ({})\n",
        ui::style_text(&company.name, ui::StyleType::Title),
        company.ticker
    );

    let quote = match &report.quote {
        Ok(q) => {
            output.push_str(&format!(
                "Quote: {} (fetched {})\n",
                ui::style_text(
                    &ui::format_money(q.price, q.currency.as_deref()),
                    ui::StyleType::Label
                ),
                q.fetched_at.format("%Y-%m-%d %H:%M UTC")
            ));
            Some(q)
        }
        Err(e) => {
            output.push_str(&format!(
                "Quote: {}\n",
                ui::style_text(&format!("N/A ({e})"), ui::StyleType::Error)
            ));
            None
        }
    };

    let records = match &report.records {
        Ok(records) => records,
        Err(e) => {
            output.push_str(&ui::style_text(
                &format!("Could not fetch records: {e}"),
                ui::StyleType::Error,
            ));
            return output;
        }
    };

    if records.is_empty() {
        output.push_str("No yearly records for this company yet.");
        return output;
    }

    match projection::project(company, records, quote, settings) {
        Ok(projections) => {
            output.push('\n');
            output.push_str(&render_projections(&projections));
        }
        Err(e) => {
            output.push_str(&ui::style_text(
                &format!("Cannot project records: {e}"),
                ui::StyleType::Error,
            ));
        }
    }

    output
}

/// Renders the per-year metric table, most recent year first, plus the
/// recommendation and realized-CAGR footer.
fn render_projections(projections: &[YearProjection]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Year"),
        ui::header_cell("Profit"),
        ui::header_cell("EPS"),
        ui::header_cell("Est EPS"),
        ui::header_cell("Proj Div"),
        ui::header_cell("Div YoY"),
        ui::header_cell("Yield E"),
        ui::header_cell("Ceiling"),
        ui::header_cell("Margin"),
        ui::header_cell("Rec"),
    ]);

    let mut any_partial = false;
    for p in projections.iter().rev() {
        let m = &p.metrics;
        let year_label = if m.partial_year {
            any_partial = true;
            format!("{}*", p.record.year)
        } else {
            p.record.year.to_string()
        };

        table.add_row(vec![
            Cell::new(year_label),
            Cell::new(format!("{:.0}", m.annual_profit)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", m.eps)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", m.estimated_eps)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", m.projected_dividend)).set_alignment(CellAlignment::Right),
            m.yoy_growth.map_or_else(|| ui::na_cell(false), ui::change_cell),
            ui::format_optional_cell(m.yield_on_cost, |y| format!("{:.2}%", y * 100.0)),
            ui::format_optional_cell(m.price_ceiling, |c| format!("{c:.2}")),
            m.margin_of_safety
                .map_or_else(|| ui::na_cell(false), ui::change_cell),
            ui::recommendation_cell(m.recommendation),
        ]);
    }

    let mut output = table.to_string();
    if any_partial {
        output.push_str(&format!(
            "\n{}",
            ui::style_text("* partial year (Q4 pending)", ui::StyleType::Subtle)
        ));
    }

    if let Some(latest) = projections.last() {
        let margin = latest
            .metrics
            .margin_of_safety
            .map_or("N/A".to_string(), |m| format!("{:.2}%", m * 100.0));
        output.push_str(&format!(
            "\n\nLatest ({}): {} (margin {})",
            latest.record.year,
            ui::style_text(
                &latest.metrics.recommendation.to_string(),
                match latest.metrics.recommendation {
                    crate::core::projection::Recommendation::Sell => ui::StyleType::Error,
                    crate::core::projection::Recommendation::Unknown => ui::StyleType::Subtle,
                    _ => ui::StyleType::Good,
                }
            ),
            margin
        ));
    }

    if let Some(cagr) = projection::realized_profit_cagr(projections) {
        output.push_str(&format!(
            "\nRealized profit CAGR ({} recorded years): {:.2}%",
            projections.len(),
            cagr * 100.0
        ));
    }

    output
}
