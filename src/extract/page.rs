// src/extract/page.rs
// =============================================================================
// The page extractor: given one parsed page, find
//
// - links:  every <a href>, normalized, kept only if it's inside the crawl root
// - assets: every <link href>, <img src> and <script src>, kept only if it
//           matches an asset pattern, then normalized
//
// Assets are deliberately NOT restricted to the crawl domain. A stylesheet on
// a CDN or a font service is still an asset of the page.
//
// Both lists keep document order and keep duplicates.
// =============================================================================

use serde::Serialize;

use super::document::{Document, ParseError};
use super::urls::{in_domain, is_asset, Normalizer};
use crate::config::CrawlConfig;

// (tag, attribute) pairs that carry assets, in output order:
// stylesheets (and other <link>s such as icons), then images, then scripts
const ASSET_SOURCES: [(&str, &str); 3] = [("link", "href"), ("img", "src"), ("script", "src")];

/// Everything one page points at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageRefs {
    pub links: Vec<String>,
    pub assets: Vec<String>,
}

/// Extracts links and assets using one crawl's rules.
#[derive(Debug, Clone)]
pub struct PageExtractor {
    normalizer: Normalizer,
    asset_spec: Vec<String>,
}

impl PageExtractor {
    pub fn new(config: &CrawlConfig) -> Self {
        Self {
            normalizer: Normalizer::new(config.root(), config.resolve_relative()),
            asset_spec: config.asset_spec().to_vec(),
        }
    }

    /// Runs both extractions against `document`, which was fetched from `page`.
    pub fn extract(&self, page: &str, document: &Document) -> Result<PageRefs, ParseError> {
        Ok(PageRefs {
            links: self.links(page, document)?,
            assets: self.assets(page, document)?,
        })
    }

    fn links(&self, page: &str, document: &Document) -> Result<Vec<String>, ParseError> {
        let root = self.normalizer.root();

        let links = document
            .attribute_values("a", "href")?
            .into_iter()
            .map(|href| self.normalizer.resolve(page, &href))
            .filter(|link| in_domain(root, link))
            .collect();

        Ok(links)
    }

    // Patterns are matched against the raw attribute value, before
    // normalization.
    fn assets(&self, page: &str, document: &Document) -> Result<Vec<String>, ParseError> {
        let mut raw = Vec::new();
        for (tag, attr) in ASSET_SOURCES {
            raw.extend(document.attribute_values(tag, attr)?);
        }

        let assets = raw
            .into_iter()
            .filter(|value| is_asset(value, self.asset_spec.as_slice()))
            .map(|value| self.normalizer.resolve(page, &value))
            .collect();

        Ok(assets)
    }
}
