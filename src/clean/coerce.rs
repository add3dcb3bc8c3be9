//! Type coercer: turns the concatenated text table into typed records.
//!
//! Any date or amount that fails to parse aborts the whole run; there is no
//! per-row quarantine and no partial output.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use super::fragment::{Field, Fragment};
use crate::statement::{Record, Statement};

/// Parse a decimal amount like `"1,234.56"` into minor units (`123456`).
///
/// Thousands separators are stripped and the value is truncated toward zero
/// past two decimals. Pure string math; no float rounding drift.
pub fn parse_minor_units(raw: &str) -> Result<i64> {
    let cleaned = raw.trim().replace(',', "");
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        bail!("not a number: {raw:?}");
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        bail!("not a number: {raw:?}");
    }
    let whole: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().with_context(|| format!("amount out of range: {raw:?}"))?
    };
    let mut cents = whole * 100;
    let mut frac = frac_part.chars();
    if let Some(c) = frac.next() {
        cents += (c.to_digit(10).unwrap() as i64) * 10;
    }
    if let Some(c) = frac.next() {
        cents += c.to_digit(10).unwrap() as i64;
    }
    Ok(if negative { -cents } else { cents })
}

/// Render minor units back to the two-decimal text form (`123456` →
/// `"1234.56"`), as written into the spreadsheet.
pub fn format_major_units(cents: i64) -> String {
    format!("{:.2}", cents as f64 / 100.0)
}

fn required<'a>(row: &'a [Option<String>], col: usize, field: Field, idx: usize) -> Result<&'a str> {
    match &row[col] {
        Some(text) => Ok(text.as_str()),
        None => bail!("row {}: missing {}", idx + 1, field.name()),
    }
}

/// Coerce the concatenated six-column table into a typed [`Statement`].
pub fn coerce(table: &Fragment) -> Result<Statement> {
    let col = |field: Field| -> Result<usize> {
        table
            .column(field.name())
            .with_context(|| format!("table is missing column {}", field.name()))
    };
    let date_col = col(Field::BookingDate)?;
    let currency_col = col(Field::Currency)?;
    let amount_col = col(Field::Amount)?;
    let balance_col = col(Field::Balance)?;
    let summary_col = col(Field::Summary)?;
    let cp_col = col(Field::Counterparty)?;

    let mut statement = Statement::default();
    for (idx, row) in table.rows.iter().enumerate() {
        let date_text = required(row, date_col, Field::BookingDate, idx)?;
        let date = NaiveDate::parse_from_str(date_text.trim(), "%Y-%m-%d")
            .with_context(|| format!("row {}: bad date {:?}", idx + 1, date_text))?;
        let amount_text = required(row, amount_col, Field::Amount, idx)?;
        let amount_cents = parse_minor_units(amount_text)
            .with_context(|| format!("row {}: bad 交易金额", idx + 1))?;
        let balance_text = required(row, balance_col, Field::Balance, idx)?;
        let balance_cents = parse_minor_units(balance_text)
            .with_context(|| format!("row {}: bad 联机余额", idx + 1))?;

        let currency_text = required(row, currency_col, Field::Currency, idx)?;
        let currency = statement.currencies.intern(currency_text.trim());
        // summary and counterparty may be blank but never missing downstream
        let summary = row[summary_col].clone().unwrap_or_default();
        let counterparty = statement
            .counterparties
            .intern(row[cp_col].as_deref().unwrap_or(""));

        statement.records.push(Record {
            date,
            currency,
            amount_cents,
            balance_cents,
            summary,
            counterparty,
        });
    }
    Ok(statement)
}
