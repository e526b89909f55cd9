// src/extract/mod.rs
// =============================================================================
// This module turns a fetched page into the references the crawl cares about.
//
// Submodules:
// - urls: normalization, domain containment and asset matching (pure functions)
// - document: HTML parsing and absent-aware attribute lookup
// - page: the page extractor that combines the two
// =============================================================================

mod document;
mod page;
pub mod urls;

pub use document::{Document, ParseError};
pub use page::{PageExtractor, PageRefs};
