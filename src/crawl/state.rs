// src/crawl/state.rs
// =============================================================================
// The mutable bookkeeping of one crawl, kept in a single value:
//
// - visited:   every URL fetched or queued so far (never shrinks)
// - frontier:  URLs to fetch in the current iteration
// - manifest:  one entry per fetched page, in fetch order
// - iteration: how many iterations have completed
//
// The visited set is the only deduplication gate. A link is added to it the
// moment it is queued, before it is fetched, so a URL can never be queued
// twice, even if the iteration budget runs out before it is fetched.
// =============================================================================

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// One fetched page and the assets it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub url: String,
    pub assets: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CrawlState {
    visited: IndexSet<String>,
    frontier: Vec<String>,
    manifest: Vec<ManifestEntry>,
    iteration: usize,
}

impl CrawlState {
    /// Fresh state: the root is both visited and the whole frontier.
    pub fn new(root: &str) -> Self {
        let mut visited = IndexSet::new();
        visited.insert(root.to_string());

        Self {
            visited,
            frontier: vec![root.to_string()],
            manifest: Vec::new(),
            iteration: 0,
        }
    }

    /// Hands out the current frontier, leaving it empty.
    pub fn take_frontier(&mut self) -> Vec<String> {
        std::mem::take(&mut self.frontier)
    }

    pub fn record(&mut self, url: String, assets: Vec<String>) {
        self.manifest.push(ManifestEntry { url, assets });
    }

    // Closes an iteration: builds the next frontier from this iteration's
    // discovered links and bumps the counter.
    //
    // Candidates are taken in order; the first occurrence of a new URL wins
    // and later repeats (or anything already visited) are dropped.
    //
    // Returns the size of the new frontier.
    pub fn advance<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        for link in candidates {
            if !self.visited.contains(&link) {
                self.visited.insert(link.clone());
                self.frontier.push(link);
            }
        }

        self.iteration += 1;
        self.frontier.len()
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Consumes the state, returning the manifest and the visited set.
    pub fn into_parts(self) -> (Vec<ManifestEntry>, IndexSet<String>) {
        (self.manifest, self.visited)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is IndexSet?
//    - A HashSet that remembers insertion order (from the indexmap crate)
//    - insert() returns false if the value was already there
//    - Iterating it gives URLs in the order they were discovered
//
// 2. Why does take_frontier use std::mem::take?
//    - It moves the Vec out and leaves an empty one behind
//    - No clone, and the state stays valid for the next iteration
// -----------------------------------------------------------------------------
