//! Schema projector: after normalization every fragment is cut down to the
//! six canonical columns, then all fragments are concatenated in page order.

use anyhow::{bail, Result};
use tracing::debug;

use super::fragment::{Field, Fragment};

/// Drop every column whose header is not a canonical field name. The
/// relative order of the kept columns is preserved; downstream stages
/// address columns by name, not position.
pub fn project(frag: &mut Fragment) {
    let keep: Vec<bool> = frag
        .headers
        .iter()
        .map(|h| Field::from_name(h).is_some())
        .collect();
    if keep.iter().any(|k| !k) {
        debug!(
            dropped = keep.iter().filter(|k| !**k).count(),
            "dropping non-canonical columns"
        );
        frag.retain_columns(&keep);
    }
}

/// Concatenate projected fragments into one table in canonical column
/// order. Fragment order and per-fragment row order are preserved exactly;
/// nothing is ever re-sorted. Fragments without rows contribute nothing.
pub fn concat(fragments: Vec<Fragment>) -> Result<Fragment> {
    let mut out = Fragment::new(
        Field::ALL.iter().map(|f| f.name().to_string()).collect(),
        Vec::new(),
    );
    for (idx, frag) in fragments.into_iter().enumerate() {
        if frag.rows.is_empty() {
            continue;
        }
        let mut mapping = Vec::with_capacity(Field::ALL.len());
        for field in Field::ALL {
            match frag.column(field.name()) {
                Some(col) => mapping.push(col),
                None => bail!("fragment {} is missing column {}", idx + 1, field.name()),
            }
        }
        for row in frag.rows {
            out.rows
                .push(mapping.iter().map(|&col| row[col].clone()).collect());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::fragment::Cell;

    fn s(v: &str) -> Cell {
        Some(v.to_string())
    }

    fn canonical_headers() -> Vec<String> {
        Field::ALL.iter().map(|f| f.name().to_string()).collect()
    }

    fn canonical_row(date: &str) -> Vec<Cell> {
        vec![s(date), s("CNY"), s("1.00"), s("2.00"), s(""), s("")]
    }

    #[test]
    fn non_canonical_columns_are_dropped() {
        let mut headers = canonical_headers();
        headers.insert(0, "记账日期 货币".to_string());
        headers.push("new交易金额".to_string());
        let mut row = canonical_row("2024-01-01");
        row.insert(0, s("composite"));
        row.push(s(""));
        let mut frag = Fragment::new(headers, vec![row]);

        project(&mut frag);
        assert_eq!(frag.headers, canonical_headers());
        assert_eq!(frag.rows[0], canonical_row("2024-01-01"));
    }

    #[test]
    fn projection_is_idempotent_on_canonical_fragments() {
        let mut frag = Fragment::new(canonical_headers(), vec![canonical_row("2024-01-01")]);
        let before = frag.clone();
        crate::clean::normalize::normalize_columns(&mut frag);
        project(&mut frag);
        assert_eq!(frag, before);
        crate::clean::normalize::normalize_columns(&mut frag);
        project(&mut frag);
        assert_eq!(frag, before);
    }

    #[test]
    fn concat_preserves_fragment_and_row_order() {
        let frags = vec![
            Fragment::new(
                canonical_headers(),
                vec![canonical_row("2024-01-01"), canonical_row("2024-01-02")],
            ),
            Fragment::new(canonical_headers(), Vec::new()),
            Fragment::new(canonical_headers(), vec![canonical_row("2023-12-31")]),
        ];
        let table = concat(frags).unwrap();
        let dates: Vec<&Cell> = table.rows.iter().map(|r| &r[0]).collect();
        // page order, never re-sorted by value
        assert_eq!(
            dates,
            vec![&s("2024-01-01"), &s("2024-01-02"), &s("2023-12-31")]
        );
    }

    #[test]
    fn concat_remaps_shuffled_columns_by_name() {
        let mut headers = canonical_headers();
        headers.swap(0, 1);
        let frag = Fragment::new(
            headers,
            vec![vec![s("CNY"), s("2024-01-01"), s("1.00"), s("2.00"), s(""), s("")]],
        );
        let table = concat(vec![frag]).unwrap();
        assert_eq!(table.rows[0][0], s("2024-01-01"));
        assert_eq!(table.rows[0][1], s("CNY"));
    }

    #[test]
    fn concat_rejects_incomplete_fragments() {
        let frag = Fragment::new(
            vec!["记账日期".to_string()],
            vec![vec![s("2024-01-01")]],
        );
        assert!(concat(vec![frag]).is_err());
    }
}
