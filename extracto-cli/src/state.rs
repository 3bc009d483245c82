use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `~/.extracto`, or `$EXTRACTO_HOME` when set.
pub fn extracto_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("EXTRACTO_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".extracto"))
}

pub fn ensure_extracto_home() -> Result<PathBuf> {
    let dir = extracto_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
