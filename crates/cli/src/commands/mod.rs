//! Subcommand implementations

pub mod collect;
pub mod features;
pub mod predict;
pub mod schema;

use anyhow::{Context, Result};
use boxoffice_lib::RawMovieRecord;
use std::path::Path;

/// Read one JSON object from a file
pub fn read_record(path: &Path) -> Result<RawMovieRecord> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read record {:?}", path))?;
    RawMovieRecord::from_json_str(&content).with_context(|| format!("Invalid record in {:?}", path))
}

/// One title per line; blank lines and `#` comments are skipped
pub fn read_titles(path: &Path) -> Result<Vec<String>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read titles {:?}", path))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
