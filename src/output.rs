// src/output.rs
// =============================================================================
// Serializes crawl results and writes them to disk.
//
// Files written by write_outputs:
// - assets.json: one {"url": ..., "assets": [...]} record per page
// - urls.txt:    every visited URL, one per line, in discovery order
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::crawl::{CrawlReport, ManifestEntry};

pub const MANIFEST_FILE: &str = "assets.json";
pub const URLS_FILE: &str = "urls.txt";

/// Pretty-printed JSON array of manifest entries (keys in "url", "assets" order).
pub fn manifest_json(manifest: &[ManifestEntry]) -> Result<String> {
    serde_json::to_string_pretty(manifest).context("failed to serialize manifest")
}

pub fn visited_text<'a, I>(visited: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let mut text = String::new();
    for url in visited {
        text.push_str(url);
        text.push('\n');
    }
    text
}

// Writes both files into `dir`, creating it when needed.
//
// Returns the paths that were written.
pub fn write_outputs(dir: &Path, report: &CrawlReport) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let manifest_path = dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, manifest_json(&report.manifest)?)
        .with_context(|| format!("failed to write {}", manifest_path.display()))?;

    let urls_path = dir.join(URLS_FILE);
    fs::write(&urls_path, visited_text(&report.visited))
        .with_context(|| format!("failed to write {}", urls_path.display()))?;

    Ok((manifest_path, urls_path))
}
