//! Spreadsheet writer: the cleaned statement as `output.xlsx`.

use anyhow::{Context, Result};
use chrono::Datelike;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::clean::coerce::format_major_units;
use crate::clean::fragment::Field;
use crate::statement::Statement;

/// Write one `Sheet1` with the six canonical headers, real date cells
/// formatted `yyyy-mm-dd`, amounts in major units with two decimals, and
/// each column sized to twice its longest rendered value.
pub fn write_xlsx(statement: &Statement, out_dir: &Path) -> Result<PathBuf> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1")?;

    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let money_format = Format::new().set_num_format("0.00");

    let mut widths: Vec<usize> = Field::ALL
        .iter()
        .map(|f| f.name().chars().count())
        .collect();
    let mut widen = |col: usize, rendered: &str| {
        widths[col] = widths[col].max(rendered.chars().count());
    };

    for (col, field) in Field::ALL.iter().enumerate() {
        sheet.write_string(0, col as u16, field.name())?;
    }

    for (idx, rec) in statement.records.iter().enumerate() {
        let row = idx as u32 + 1;
        let date = ExcelDateTime::from_ymd(
            rec.date.year() as u16,
            rec.date.month() as u8,
            rec.date.day() as u8,
        )?;
        sheet.write_datetime_with_format(row, 0, date, &date_format)?;
        widen(0, "yyyy-mm-dd");

        let currency = statement.currencies.get(rec.currency);
        sheet.write_string(row, 1, currency)?;
        widen(1, currency);

        sheet.write_number_with_format(row, 2, rec.amount_cents as f64 / 100.0, &money_format)?;
        widen(2, &format_major_units(rec.amount_cents));

        sheet.write_number_with_format(row, 3, rec.balance_cents as f64 / 100.0, &money_format)?;
        widen(3, &format_major_units(rec.balance_cents));

        sheet.write_string(row, 4, &rec.summary)?;
        widen(4, &rec.summary);

        let counterparty = statement.counterparties.get(rec.counterparty);
        sheet.write_string(row, 5, counterparty)?;
        widen(5, counterparty);
    }

    for (col, width) in widths.iter().enumerate() {
        sheet.set_column_width(col as u16, (width * 2) as f64)?;
    }

    let path = out_dir.join("output.xlsx");
    workbook
        .save(&path)
        .with_context(|| format!("failed to save {}", path.display()))?;
    info!(path = %path.display(), rows = statement.records.len(), "spreadsheet written");
    Ok(path)
}
