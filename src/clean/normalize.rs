//! Column normalizer: splits composite extracted columns back into the
//! canonical field set.
//!
//! With column guessing disabled the extractor can detect one wide column
//! whose header is a space-joined run of canonical names ("记账日期 货币")
//! and whose cells carry the date and currency glued to the leading text.
//! The date and currency substrings are pulled out into their own columns
//! here; the schema projector then drops whatever is left over.

use tracing::debug;

use super::fragment::{Field, Fragment};
use super::text::{find_currency, find_date};

const SPLIT_PREFIX: &str = "new";

/// Split non-canonical headers into per-token columns, extract the date and
/// currency substrings into them, and fill missing counterparty cells from
/// the stripped leading column.
pub fn normalize_columns(frag: &mut Fragment) {
    // 1) one new empty column per header token, inserted after the offender
    let composites: Vec<(usize, Vec<String>)> = frag
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| Field::from_name(h.as_str()).is_none())
        .map(|(i, h)| (i, h.split(' ').map(str::to_string).collect()))
        .collect();
    // right-to-left so earlier insertion points stay valid
    for (col, tokens) in composites.iter().rev() {
        debug!(header = %frag.headers[*col], "splitting composite column");
        for (k, token) in tokens.iter().enumerate() {
            frag.insert_column(col + 1 + k, format!("{SPLIT_PREFIX}{token}"));
        }
    }

    // 2) populate the synthesized date/currency columns from the composite
    //    cell, which is always the leading data column
    extract_into(frag, Field::BookingDate, find_date);
    extract_into(frag, Field::Currency, find_currency);

    // 3) missing counterparty cells fall back to the stripped leading cell
    if let Some(cp) = frag.column(Field::Counterparty.name()) {
        for row in &mut frag.rows {
            if row[cp].is_none() {
                row[cp] = Some(row[0].clone().unwrap_or_default());
            }
        }
    }

    // 4) the populated synthesized columns take the canonical names
    for field in [Field::BookingDate, Field::Currency] {
        let synth = format!("{SPLIT_PREFIX}{}", field.name());
        if let Some(col) = frag.column(&synth) {
            frag.headers[col] = field.name().to_string();
        }
    }
}

/// Copy the first `matcher` hit of each row's leading cell into the
/// synthesized column for `field`, removing it from the leading cell.
fn extract_into(frag: &mut Fragment, field: Field, matcher: fn(&str) -> Option<&str>) {
    let synth = format!("{SPLIT_PREFIX}{}", field.name());
    let Some(col) = frag.column(&synth) else {
        return;
    };
    for row in &mut frag.rows {
        let Some(lead) = row[0].clone() else {
            continue;
        };
        if let Some(hit) = matcher(&lead) {
            let hit = hit.to_string();
            row[col] = Some(hit.clone());
            row[0] = Some(lead.replace(&hit, ""));
        }
    }
}
