//! The data-reconstruction pipeline: raw extracted fragments in, typed
//! statement out.
//!
//! Per fragment: merge wrapped rows, normalize composite columns, project to
//! the canonical schema. Then all fragments are concatenated in page order
//! and the text columns are coerced to real types. Fragments are independent
//! until the concatenation step; the whole pipeline is synchronous.

pub mod coerce;
pub mod fragment;
pub mod merge;
pub mod normalize;
pub mod project;
pub mod text;

use anyhow::Result;
use tracing::info;

use crate::statement::Statement;
use fragment::Fragment;

/// Run every fragment through the cleaning stages and coerce the
/// concatenated result. Fails if any canonical value refuses to parse.
pub fn clean(fragments: Vec<Fragment>) -> Result<Statement> {
    let total = fragments.len();
    let mut cleaned = Vec::with_capacity(total);
    for (idx, mut frag) in fragments.into_iter().enumerate() {
        frag.rows = merge::merge_rows(frag.rows);
        normalize::normalize_columns(&mut frag);
        project::project(&mut frag);
        info!("page {}/{} cleaned", idx + 1, total);
        cleaned.push(frag);
    }
    let table = project::concat(cleaned)?;
    coerce::coerce(&table)
}
