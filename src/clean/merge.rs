//! Row merger: re-fuses logical rows that the PDF extraction split across
//! two or three physical lines because a cell's content wrapped.
//!
//! A single forward pass over the extracted rows builds the output; every
//! iteration consumes at least one input row, so the pass terminates no
//! matter how degenerate the input is.

use tracing::debug;

use super::fragment::Cell;
use super::text::{has_cjk, has_digit, insert_after_cjk};

/// Column index of the sole missing cell, if the row has exactly one.
fn sole_missing(row: &[Cell]) -> Option<usize> {
    let mut found = None;
    for (i, cell) in row.iter().enumerate() {
        if cell.is_none() {
            if found.is_some() {
                return None;
            }
            found = Some(i);
        }
    }
    found
}

/// Content of the sole populated cell, if the row has exactly one.
fn sole_populated(row: &[Cell]) -> Option<&str> {
    let mut found = None;
    for cell in row {
        if let Some(text) = cell {
            if found.is_some() {
                return None;
            }
            found = Some(text.as_str());
        }
    }
    found
}

fn first_cell_has_cjk(row: &[Cell]) -> bool {
    row.first()
        .and_then(|c| c.as_deref())
        .map_or(false, has_cjk)
}

fn last_cell_missing(row: &[Cell]) -> bool {
    row.last().map_or(false, Option::is_none)
}

/// Discard heading rows and merge wrapped rows back together.
///
/// Rows before the first row containing any digit are page/table headers and
/// are dropped; from that row on everything is data, digits or not.
///
/// Two merge shapes, matching how the statement wraps:
///
/// * split tail cell: an overflow line above (one populated cell), the real
///   row with exactly one hole, and the continuation below supply the hole's
///   value as overflow + continuation;
/// * trailing CJK wrap: a row whose last cell is missing and whose first
///   cell is Chinese text absorbs following single-cell lines into that
///   first cell, spliced after the Chinese runs.
///
/// Rows matching neither shape pass through untouched; an unsatisfied
/// precondition is never an error.
pub fn merge_rows(rows: Vec<Vec<Cell>>) -> Vec<Vec<Cell>> {
    let start = rows
        .iter()
        .position(|row| {
            row.iter()
                .any(|c| c.as_deref().map_or(false, has_digit))
        })
        .unwrap_or(rows.len());
    if start > 0 {
        debug!(skipped = start, "dropped heading rows");
    }
    let input = &rows[start..];

    let mut out: Vec<Vec<Cell>> = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        // Split tail-cell shape: (sole populated, sole missing, tail).
        if i + 1 < input.len() {
            if let (Some(overflow), Some(hole)) =
                (sole_populated(&input[i]), sole_missing(&input[i + 1]))
            {
                let mut merged = input[i + 1].clone();
                let tail_was_missing = last_cell_missing(&merged);
                // On the true last row there is no continuation line; the
                // original appended a synthetic blank row here.
                let continuation = input
                    .get(i + 2)
                    .and_then(|row| row.get(hole).cloned().flatten())
                    .unwrap_or_default();
                merged[hole] = Some(format!("{overflow}{continuation}"));
                i += if i + 2 < input.len() { 3 } else { 2 };
                // The CJK shape may still apply to the merged row; it is
                // first judged on the pre-merge tail cell.
                i = absorb_continuations(input, i, &mut merged, tail_was_missing);
                out.push(merged);
                continue;
            }
        }

        let mut row = input[i].clone();
        i += 1;
        if last_cell_missing(&row) && first_cell_has_cjk(&row) {
            i = absorb_continuations(input, i, &mut row, true);
        }
        out.push(row);
    }
    out
}

/// While `row` still qualifies for the trailing-CJK shape, splice each
/// following single-cell line into its first cell. Returns the input index
/// after the absorbed lines.
fn absorb_continuations(
    input: &[Vec<Cell>],
    mut i: usize,
    row: &mut Vec<Cell>,
    mut tail_missing: bool,
) -> usize {
    while tail_missing && first_cell_has_cjk(row) {
        let Some(next) = input.get(i).and_then(|r| sole_populated(r)) else {
            break;
        };
        let first = row[0].take().unwrap_or_default();
        row[0] = Some(insert_after_cjk(&first, next));
        i += 1;
        tail_missing = last_cell_missing(row);
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Cell {
        Some(v.to_string())
    }

    #[test]
    fn heading_rows_before_first_digit_are_dropped() {
        let rows = vec![
            vec![s("招商银行"), s("流水单")],
            vec![s("记账日期"), s("货币")],
            vec![s("2024-01-02"), s("CNY")],
            vec![s("无数字行"), s("保留")],
        ];
        let merged = merge_rows(rows);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0][0], s("2024-01-02"));
        // rows after the first digit row stay, digits or not
        assert_eq!(merged[1][1], s("保留"));
    }

    #[test]
    fn split_tail_cell_fuses_three_rows_into_one() {
        let rows = vec![
            vec![None, None, s("123")],
            vec![s("2024-01-02"), s("CNY"), None],
            vec![None, None, s("456")],
        ];
        let merged = merge_rows(rows);
        assert_eq!(
            merged,
            vec![vec![s("2024-01-02"), s("CNY"), s("123456")]]
        );
    }

    #[test]
    fn split_tail_cell_on_last_row_uses_empty_continuation() {
        let rows = vec![
            vec![s("2024-01-02"), s("1"), s("x")],
            vec![None, s("头部")],
            vec![s("2024-01-03"), None],
        ];
        // second pair matches with the hole row as the final input row
        let merged = merge_rows(rows);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1], vec![s("2024-01-03"), s("头部")]);
    }

    #[test]
    fn cjk_wrap_absorbs_following_single_cell_line() {
        let rows = vec![
            vec![s("备注:"), s("1"), None],
            vec![None, s("ABC123"), None],
        ];
        let merged = merge_rows(rows);
        assert_eq!(merged, vec![vec![s("备注:ABC123"), s("1"), None]]);
    }

    #[test]
    fn cjk_wrap_absorbs_repeatedly() {
        let rows = vec![
            vec![s("摘要1"), s("x"), None],
            vec![None, s("甲"), None],
            vec![None, s("乙"), None],
            vec![s("2024-01-05"), s("y"), s("z")],
        ];
        let merged = merge_rows(rows);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0][0], s("摘要甲乙1"));
        assert_eq!(merged[1][0], s("2024-01-05"));
    }

    #[test]
    fn both_shapes_fire_on_the_same_row() {
        // tail merge fills the last cell, but the CJK check is judged on the
        // pre-merge tail, so one continuation is still absorbed
        let rows = vec![
            vec![None, s("尾1")],
            vec![s("摘要2"), None],
            vec![None, s("尾2")],
            vec![None, s("续3")],
        ];
        let merged = merge_rows(rows);
        assert_eq!(merged, vec![vec![s("摘要续32"), s("尾1尾2")]]);
    }

    #[test]
    fn unmatched_rows_pass_through_with_holes_intact() {
        let rows = vec![
            vec![s("2024-01-02"), None, s("1.00")],
            vec![s("2024-01-03"), s("CNY"), s("2.00")],
        ];
        let merged = merge_rows(rows.clone());
        assert_eq!(merged, rows);
    }

    #[test]
    fn empty_fragment_survives() {
        assert!(merge_rows(Vec::new()).is_empty());
    }
}
