// src/crawl/mod.rs
// =============================================================================
// This module handles crawling one website.
//
// Features:
// - Iteration-by-iteration (breadth-first) crawling from a root URL
// - Stays inside the root URL (text prefix containment)
// - Configurable iteration budget, or unbounded
// - No URL is ever fetched twice
//
// Submodules:
// - state: the visited set, frontier, manifest and iteration counter
// - engine: the loop that drives fetching and extraction
// =============================================================================

mod engine;
mod state;

pub use engine::{CrawlEngine, CrawlReport, Termination};
pub use state::ManifestEntry;
