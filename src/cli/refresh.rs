use super::ui;
use crate::AppContext;
use crate::core::country::iso8601;
use crate::core::summary::SummaryReport;
use anyhow::Result;
use comfy_table::Cell;

impl SummaryReport {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("#"),
            ui::header_cell("Country"),
            ui::header_cell("Currency"),
            ui::header_cell("Estimated GDP"),
        ]);

        for (rank, entry) in self.top.iter().enumerate() {
            table.add_row(vec![
                Cell::new(rank + 1),
                Cell::new(&entry.name),
                ui::format_optional_cell(entry.currency_code.as_deref(), str::to_string),
                ui::number_cell(ui::format_amount(entry.estimated_gdp)),
            ]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Top countries by estimated GDP", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\n{} {}\n{} {}",
            ui::style_text("Total countries:", ui::StyleType::TotalLabel),
            ui::style_text(&self.total.to_string(), ui::StyleType::TotalValue),
            ui::style_text("Last refreshed:", ui::StyleType::TotalLabel),
            iso8601(&self.last_refreshed_at),
        ));
        output
    }
}

pub async fn run(ctx: &AppContext) -> Result<()> {
    let pb = ui::new_spinner("Refreshing countries...");
    let result = ctx.refresher.refresh(ctx.store.as_ref()).await;
    pb.finish_and_clear();

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{}", ui::style_text(&format!("Refresh failed: {e}"), ui::StyleType::Error));
            return Err(e.into());
        }
    };

    let rows = ctx.store.all()?;
    let report = SummaryReport::from_rows(&rows, result.last_refreshed_at);
    println!("{}", report.display_as_table());
    println!(
        "{}",
        ui::style_text(
            &format!("Summary image written to {}", result.artifact_path.display()),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}
