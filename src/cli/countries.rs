use super::ui;
use crate::core::country::{CountryQuery, PersistedCountry, iso8601};
use crate::store::CountryStore;
use anyhow::Result;
use comfy_table::{Cell, Table};

fn countries_table(rows: &[PersistedCountry]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Country"),
        ui::header_cell("Region"),
        ui::header_cell("Population"),
        ui::header_cell("Currency"),
        ui::header_cell("Rate"),
        ui::header_cell("Estimated GDP"),
    ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(row.id),
            Cell::new(&row.name),
            ui::format_optional_cell(row.region.as_deref(), str::to_string),
            ui::number_cell(row.population.to_string()),
            ui::format_optional_cell(row.currency_code.as_deref(), str::to_string),
            ui::format_optional_cell(row.exchange_rate, |r| format!("{r:.4}")),
            ui::format_optional_cell(row.estimated_gdp, ui::format_amount),
        ]);
    }
    table
}

fn detail_table(row: &PersistedCountry) -> Table {
    let optional = |v: Option<&str>| v.unwrap_or("N/A").to_string();

    let mut table = ui::new_styled_table();
    let fields = [
        ("Id", row.id.to_string()),
        ("Name", row.name.clone()),
        ("Capital", optional(row.capital.as_deref())),
        ("Region", optional(row.region.as_deref())),
        ("Population", row.population.to_string()),
        ("Currency", optional(row.currency_code.as_deref())),
        (
            "Exchange rate",
            row.exchange_rate.map_or("N/A".to_string(), |r| r.to_string()),
        ),
        (
            "Estimated GDP",
            row.estimated_gdp.map_or("N/A".to_string(), ui::format_amount),
        ),
        ("Flag", optional(row.flag_url.as_deref())),
        ("Last refreshed", iso8601(&row.last_refreshed_at)),
    ];
    for (label, value) in fields {
        table.add_row(vec![ui::header_cell(label), Cell::new(value)]);
    }
    table
}

pub fn list(store: &dyn CountryStore, query: &CountryQuery) -> Result<()> {
    let rows = store.list(query)?;
    if rows.is_empty() {
        println!("{}", ui::style_text("No countries found", ui::StyleType::Subtle));
        return Ok(());
    }
    println!("{}", countries_table(&rows));
    Ok(())
}

pub fn show(store: &dyn CountryStore, name: &str) -> Result<()> {
    match store.get(name)? {
        Some(row) => {
            println!("{}\n", ui::style_text(&row.name, ui::StyleType::Title));
            println!("{}", detail_table(&row));
            Ok(())
        }
        None => anyhow::bail!("Country not found: {name}"),
    }
}

pub fn delete(store: &dyn CountryStore, name: &str) -> Result<()> {
    if !store.delete(name)? {
        anyhow::bail!("Country not found: {name}");
    }
    println!("Deleted {name}");
    Ok(())
}

pub fn status(store: &dyn CountryStore) -> Result<()> {
    let stats = store.stats()?;
    let last_refreshed = stats
        .last_refreshed_at
        .as_ref()
        .map_or("never".to_string(), iso8601);
    println!(
        "{} {}",
        ui::style_text("Total countries:", ui::StyleType::TotalLabel),
        ui::style_text(&stats.total.to_string(), ui::StyleType::TotalValue)
    );
    println!(
        "{} {}",
        ui::style_text("Last refreshed:", ui::StyleType::TotalLabel),
        last_refreshed
    );
    Ok(())
}
