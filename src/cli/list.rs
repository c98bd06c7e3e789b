use super::ui;
use crate::core::record::RecordStore;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

/// Displays the companies registered in the record store.
pub async fn run(store: &(dyn RecordStore + Send + Sync)) -> Result<()> {
    let companies = store.list_companies().await?;

    if companies.is_empty() {
        println!("No companies registered in the record store.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Company"),
        ui::header_cell("Ticker"),
        ui::header_cell("Shares Outstanding"),
    ]);

    for company in &companies {
        table.add_row(vec![
            Cell::new(company.id).set_alignment(CellAlignment::Right),
            Cell::new(&company.name),
            Cell::new(&company.ticker),
            Cell::new(company.shares_outstanding).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{table}");
    Ok(())
}
