use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Startup configuration. Read once from `config.toml` before any work;
/// a missing file or key aborts the run.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "bankstmt")]
    pub app: AppSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    /// Output directory for every produced artifact.
    pub save_path: PathBuf,
}

pub fn load(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}
