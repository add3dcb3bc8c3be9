//! Table fragment source: a thin adapter over tabula-java.
//!
//! The extraction itself is an external collaborator with a narrow
//! contract: give it a PDF, a page range, an extraction area and a
//! column-guessing switch, get back zero or more table fragments. The jar
//! is invoked as a subprocess with `--format JSON` and its stdout decoded
//! here; nothing else about the PDF is interpreted.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use crate::clean::fragment::Fragment;

/// Extraction region in page-coordinate points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Area {
    /// tabula's `--area top,left,bottom,right` argument.
    pub fn to_arg(self) -> String {
        format!("{},{},{},{}", self.top, self.left, self.bottom, self.right)
    }
}

/// The statement's first page has a taller non-data header band, so it gets
/// its own region and no column guessing.
pub const FIRST_PAGE_AREA: Area = Area {
    top: 230.0,
    left: 35.0,
    bottom: 735.0,
    right: 560.0,
};

pub const DEFAULT_AREA: Area = Area {
    top: 35.0,
    left: 35.0,
    bottom: 735.0,
    right: 560.0,
};

#[derive(Debug, Clone, Copy)]
pub enum Pages {
    All,
    Single(u32),
}

impl Pages {
    fn to_arg(self) -> String {
        match self {
            Pages::All => "all".to_string(),
            Pages::Single(n) => n.to_string(),
        }
    }
}

/// The narrow extraction contract.
pub trait FragmentSource {
    fn extract(&self, pdf: &Path, pages: Pages, area: Area, guess: bool) -> Result<Vec<Fragment>>;
}

/// Production source: shells out to the tabula jar.
pub struct TabulaExtractor {
    jar: PathBuf,
}

impl TabulaExtractor {
    /// Jar location from `TABULA_JAR`, falling back to `tabula.jar` in the
    /// working directory.
    pub fn from_env() -> Self {
        let jar = std::env::var_os("TABULA_JAR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("tabula.jar"));
        Self { jar }
    }

    pub fn new(jar: PathBuf) -> Self {
        Self { jar }
    }
}

impl FragmentSource for TabulaExtractor {
    fn extract(&self, pdf: &Path, pages: Pages, area: Area, guess: bool) -> Result<Vec<Fragment>> {
        let mut cmd = Command::new("java");
        cmd.arg("-jar")
            .arg(&self.jar)
            .arg("--pages")
            .arg(pages.to_arg())
            .arg("--area")
            .arg(area.to_arg())
            .arg("--format")
            .arg("JSON");
        if guess {
            cmd.arg("--guess");
        }
        cmd.arg(pdf);

        debug!(jar = %self.jar.display(), pages = %pages.to_arg(), "running tabula");
        let output = cmd
            .output()
            .with_context(|| format!("failed to run tabula jar {}", self.jar.display()))?;
        if !output.status.success() {
            bail!(
                "tabula exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        decode_tables(&output.stdout)
    }
}

#[derive(Deserialize)]
struct TabulaTable {
    data: Vec<Vec<TabulaCell>>,
}

#[derive(Deserialize)]
struct TabulaCell {
    text: String,
}

/// Decode tabula's JSON table list into fragments. The first row of each
/// table becomes the fragment's headers; empty cell text is the explicit
/// missing marker.
fn decode_tables(json: &[u8]) -> Result<Vec<Fragment>> {
    let tables: Vec<TabulaTable> =
        serde_json::from_slice(json).context("failed to decode tabula JSON output")?;
    let mut fragments = Vec::with_capacity(tables.len());
    for table in tables {
        let mut rows = table.data.into_iter().map(|row| {
            row.into_iter()
                .map(|cell| {
                    let text = cell.text.trim().to_string();
                    if text.is_empty() {
                        None
                    } else {
                        Some(text)
                    }
                })
                .collect::<Vec<_>>()
        });
        let headers = match rows.next() {
            Some(first) => first
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect(),
            None => Vec::new(),
        };
        fragments.push(Fragment::new(headers, rows.collect()));
    }
    Ok(fragments)
}

/// Extract every page's fragments, then re-extract page 1 with its taller
/// header band excluded and column guessing off, replacing fragment 0.
/// Zero fragments for a range is not an error; downstream tolerates it.
pub fn extract_statement(source: &dyn FragmentSource, pdf: &Path) -> Result<Vec<Fragment>> {
    let mut fragments = source.extract(pdf, Pages::All, DEFAULT_AREA, true)?;
    let first = source.extract(pdf, Pages::Single(1), FIRST_PAGE_AREA, false)?;
    match (fragments.first_mut(), first.into_iter().next()) {
        (Some(slot), Some(override_frag)) => *slot = override_frag,
        (None, Some(override_frag)) => fragments.push(override_frag),
        _ => {}
    }
    info!(fragments = fragments.len(), "extraction finished");
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn area_arg_matches_tabula_convention() {
        assert_eq!(DEFAULT_AREA.to_arg(), "35,35,735,560");
        assert_eq!(FIRST_PAGE_AREA.to_arg(), "230,35,735,560");
    }

    #[test]
    fn decode_maps_blank_text_to_missing() {
        let json = r#"[
            {"data": [
                [{"text": "记账日期"}, {"text": "货币"}],
                [{"text": "2024-01-02"}, {"text": ""}],
                [{"text": " "}, {"text": "CNY"}]
            ]},
            {"data": []}
        ]"#;
        let fragments = decode_tables(json.as_bytes()).unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].headers, vec!["记账日期", "货币"]);
        assert_eq!(
            fragments[0].rows,
            vec![
                vec![Some("2024-01-02".to_string()), None],
                vec![None, Some("CNY".to_string())],
            ]
        );
        assert!(fragments[1].headers.is_empty());
        assert!(fragments[1].rows.is_empty());
    }

    /// Records each call and serves canned fragments.
    struct FakeSource {
        calls: RefCell<Vec<(String, String, bool)>>,
        all: Vec<Fragment>,
        first: Vec<Fragment>,
    }

    impl FragmentSource for FakeSource {
        fn extract(
            &self,
            _pdf: &Path,
            pages: Pages,
            area: Area,
            guess: bool,
        ) -> Result<Vec<Fragment>> {
            self.calls
                .borrow_mut()
                .push((pages.to_arg(), area.to_arg(), guess));
            Ok(match pages {
                Pages::All => self.all.clone(),
                Pages::Single(_) => self.first.clone(),
            })
        }
    }

    fn named(n: &str) -> Fragment {
        Fragment::new(vec![n.to_string()], Vec::new())
    }

    #[test]
    fn first_page_is_re_extracted_without_guessing() {
        let source = FakeSource {
            calls: RefCell::new(Vec::new()),
            all: vec![named("page1-guessed"), named("page2")],
            first: vec![named("page1-fixed")],
        };
        let fragments = extract_statement(&source, Path::new("x.pdf")).unwrap();
        assert_eq!(fragments[0].headers, vec!["page1-fixed"]);
        assert_eq!(fragments[1].headers, vec!["page2"]);
        assert_eq!(
            *source.calls.borrow(),
            vec![
                ("all".to_string(), "35,35,735,560".to_string(), true),
                ("1".to_string(), "230,35,735,560".to_string(), false),
            ]
        );
    }

    #[test]
    fn zero_fragments_propagate_as_empty() {
        let source = FakeSource {
            calls: RefCell::new(Vec::new()),
            all: Vec::new(),
            first: Vec::new(),
        };
        let fragments = extract_statement(&source, Path::new("x.pdf")).unwrap();
        assert!(fragments.is_empty());
    }
}
