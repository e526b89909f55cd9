// src/crawl/engine.rs
// =============================================================================
// This module implements the crawl loop, one iteration at a time.
//
// How it works:
// 1. Start with the root URL as the frontier (and already in the visited set)
// 2. Fetch every frontier page and extract its links and assets
// 3. Record a manifest entry per page, even when the page failed
// 4. Queue the discovered in-domain links that haven't been seen before
// 5. Repeat until nothing new was found or the iteration budget is used up
//
// Pages inside one iteration are fetched concurrently, but their results
// come back in frontier order and are merged only after the whole iteration
// finished. That keeps the manifest order and the "first occurrence wins"
// rule exactly the same as a sequential crawl.
//
// A failing page never stops the crawl: it just contributes no links and no
// assets.
// =============================================================================

use futures::stream::{self, StreamExt};
use indexmap::IndexSet;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::state::{CrawlState, ManifestEntry};
use crate::config::CrawlConfig;
use crate::extract::{Document, PageExtractor, PageRefs, ParseError};
use crate::fetch::{FetchError, FetchedPage, Fetcher};

/// Why a crawl stopped. Both are normal endings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The last iteration found no new in-domain links
    FrontierExhausted,
    /// The configured number of iterations ran
    BudgetReached,
}

/// Everything a finished crawl produced.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub manifest: Vec<ManifestEntry>,
    /// The root plus every distinct in-domain link discovered, in discovery order
    pub visited: IndexSet<String>,
    pub iterations: usize,
    pub termination: Termination,
    /// Pages that failed to fetch or parse (their manifest entries are empty)
    pub failed_pages: usize,
}

// What went wrong on a single page
#[derive(Debug, Error)]
enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub struct CrawlEngine<F> {
    config: CrawlConfig,
    fetcher: F,
    extractor: PageExtractor,
}

impl<F: Fetcher> CrawlEngine<F> {
    pub fn new(config: CrawlConfig, fetcher: F) -> Self {
        let extractor = PageExtractor::new(&config);
        Self {
            config,
            fetcher,
            extractor,
        }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    // Runs a complete crawl.
    //
    // Every call starts from a fresh CrawlState, so an engine can be run
    // more than once and each run gives an independent report.
    pub async fn run(&self) -> CrawlReport {
        let mut state = CrawlState::new(self.config.root());
        let mut failed_pages = 0;

        let termination = loop {
            let frontier = state.take_frontier();
            info!(
                iteration = state.iteration() + 1,
                pages = frontier.len(),
                "crawling iteration"
            );

            let outcomes = self.visit_all(&frontier).await;

            // Merge step: runs only after every page of the iteration is done
            let mut discovered = Vec::new();
            for (url, outcome) in frontier.into_iter().zip(outcomes) {
                match outcome {
                    Ok(refs) => {
                        debug!(
                            url = %url,
                            links = refs.links.len(),
                            assets = refs.assets.len(),
                            "page extracted"
                        );
                        discovered.extend(refs.links);
                        state.record(url, refs.assets);
                    }
                    Err(e) => {
                        warn!(url = %url, error = %e, "page skipped");
                        failed_pages += 1;
                        state.record(url, Vec::new());
                    }
                }
            }

            let queued = state.advance(discovered);

            if queued == 0 {
                info!("no more links left");
                break Termination::FrontierExhausted;
            }
            if self.config.budget().is_exhausted(state.iteration()) {
                info!(budget = %self.config.budget(), unfetched = queued, "iteration budget reached");
                break Termination::BudgetReached;
            }
        };

        let iterations = state.iteration();
        let (manifest, visited) = state.into_parts();

        CrawlReport {
            manifest,
            visited,
            iterations,
            termination,
            failed_pages,
        }
    }

    /// Fetches and extracts a single page; used by `inspect`.
    pub async fn inspect(&self, url: &str) -> anyhow::Result<PageRefs> {
        Ok(self.visit(url).await?)
    }

    // Fetch + extract for every frontier URL, at most `concurrency` at a time.
    // `buffered` (unlike `buffer_unordered`) yields results in input order.
    async fn visit_all(&self, frontier: &[String]) -> Vec<Result<PageRefs, PageError>> {
        stream::iter(frontier.iter().map(|url| self.visit(url)))
            .buffered(self.config.concurrency())
            .collect()
            .await
    }

    async fn visit(&self, url: &str) -> Result<PageRefs, PageError> {
        debug!(url = %url, "fetching");
        let page = self.fetcher.fetch(url).await?;
        Ok(self.extract(&page)?)
    }

    // Kept synchronous: scraper's Html isn't Send, so the parsed document
    // must not live across an await point.
    fn extract(&self, page: &FetchedPage) -> Result<PageRefs, ParseError> {
        let document = Document::parse(&page.body, page.content_type.as_deref())?;
        self.extractor.extract(&page.url, &document)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is CrawlEngine generic over F: Fetcher?
//    - main.rs plugs in HttpFetcher (real network)
//    - Tests plug in an in-memory site, so no server is needed
//
// 2. What does .buffered(n) do?
//    - Runs up to n futures from the stream at once
//    - Hands results back in the same order the futures went in
//    - buffer_unordered would be faster to drain but would shuffle the
//      manifest
//
// 3. Why do failed pages still get a manifest entry?
//    - Every visited URL appears exactly once in the output
//    - The failure itself goes to the log and to failed_pages
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_asset_spec, IterationBudget};
    use crate::extract::urls::{in_domain, is_asset};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::num::NonZeroUsize;
    use std::sync::Mutex;
    use std::time::Duration;

    const ROOT: &str = "http://site.test/";

    // An in-memory website that remembers every request it served
    #[derive(Default)]
    struct StaticSite {
        pages: HashMap<String, Result<FetchedPage, FetchError>>,
        delays: HashMap<String, Duration>,
        requests: Mutex<Vec<String>>,
    }

    impl StaticSite {
        fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                Ok(FetchedPage {
                    url: url.to_string(),
                    body: html.to_string(),
                    content_type: Some("text/html".to_string()),
                }),
            );
            self
        }

        fn failing(mut self, url: &str, error: FetchError) -> Self {
            self.pages.insert(url.to_string(), Err(error));
            self
        }

        fn binary(mut self, url: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                Ok(FetchedPage {
                    url: url.to_string(),
                    body: "\u{89}PNG".to_string(),
                    content_type: Some("image/png".to_string()),
                }),
            );
            self
        }

        fn slow(mut self, url: &str, millis: u64) -> Self {
            self.delays.insert(url.to_string(), Duration::from_millis(millis));
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for StaticSite {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            if let Some(delay) = self.delays.get(url) {
                tokio::time::sleep(*delay).await;
            }
            self.pages
                .get(url)
                .cloned()
                .unwrap_or(Err(FetchError::Status(404)))
        }
    }

    fn limited(n: usize) -> IterationBudget {
        IterationBudget::Limited(NonZeroUsize::new(n).unwrap())
    }

    fn engine(site: StaticSite, spec: &str, budget: IterationBudget) -> CrawlEngine<StaticSite> {
        let config = CrawlConfig::new(ROOT, parse_asset_spec(spec), budget).unwrap();
        CrawlEngine::new(config, site)
    }

    fn visited(report: &CrawlReport) -> Vec<&str> {
        report.visited.iter().map(String::as_str).collect()
    }

    fn pages(report: &CrawlReport) -> Vec<&str> {
        report.manifest.iter().map(|entry| entry.url.as_str()).collect()
    }

    #[tokio::test]
    async fn test_root_without_links_stops_immediately() {
        let site = StaticSite::default().page(ROOT, "<p>nothing to see</p>");
        let report = engine(site, ".css", IterationBudget::Unbounded).run().await;

        assert_eq!(visited(&report), vec![ROOT]);
        assert_eq!(report.manifest.len(), 1);
        assert_eq!(report.iterations, 1);
        assert_eq!(report.termination, Termination::FrontierExhausted);
    }

    #[tokio::test]
    async fn test_stylesheets_on_and_off_domain() {
        let html = r#"
            <link rel="stylesheet" href="/css/bootstrap.css">
            <link rel="stylesheet" href="/css/main.css">
            <link rel="stylesheet" href="//fonts.example.net/garamond.css">
        "#;
        let site = StaticSite::default().page(ROOT, html);
        let report = engine(site, ".css", limited(1)).run().await;

        assert_eq!(
            report.manifest,
            vec![ManifestEntry {
                url: ROOT.to_string(),
                assets: vec![
                    "http://site.test/css/bootstrap.css".to_string(),
                    "http://site.test/css/main.css".to_string(),
                    "http://fonts.example.net/garamond.css".to_string(),
                ],
            }]
        );
        assert_eq!(visited(&report), vec![ROOT]);
    }

    #[tokio::test]
    async fn test_follows_root_relative_link() {
        let site = StaticSite::default()
            .page(ROOT, r#"<a href="/about">About</a><a href="mailto:me@site.test">Mail</a>"#)
            .page("http://site.test/about", "<h1>About</h1>");
        let report = engine(site, "mail", limited(2)).run().await;

        assert_eq!(visited(&report), vec![ROOT, "http://site.test/about"]);
        assert_eq!(pages(&report), vec![ROOT, "http://site.test/about"]);
        assert!(report.manifest.iter().all(|entry| entry.assets.is_empty()));
    }

    #[tokio::test]
    async fn test_budget_cut_links_are_visited_but_not_fetched() {
        let site = StaticSite::default()
            .page(ROOT, r#"<a href="/a">A</a>"#)
            .page("http://site.test/a", r#"<a href="/b">B</a>"#);
        let engine = engine(site, ".css", limited(1));
        let report = engine.run().await;

        assert_eq!(report.termination, Termination::BudgetReached);
        assert_eq!(report.iterations, 1);
        assert_eq!(pages(&report), vec![ROOT]);
        assert_eq!(visited(&report), vec![ROOT, "http://site.test/a"]);
        assert_eq!(engine.fetcher.requests(), vec![ROOT]);
    }

    #[tokio::test]
    async fn test_budget_respected() {
        // A chain of pages longer than the budget
        let mut site = StaticSite::default().page(ROOT, r#"<a href="/p1">next</a>"#);
        for i in 1..10 {
            let url = format!("http://site.test/p{}", i);
            let html = format!(r#"<a href="/p{}">next</a>"#, i + 1);
            site = site.page(&url, &html);
        }
        let engine = engine(site, ".css", limited(3));
        let report = engine.run().await;

        assert_eq!(report.iterations, 3);
        assert_eq!(report.manifest.len(), 3);
        assert_eq!(engine.fetcher.requests().len(), 3);
        assert_eq!(report.visited.len(), 4);
    }

    #[tokio::test]
    async fn test_no_url_fetched_twice() {
        let site = StaticSite::default()
            .page(ROOT, r#"<a href="/a">A</a><a href="/a">A again</a><a href="/b">B</a><a href="/">Home</a>"#)
            .page("http://site.test/a", r#"<a href="/b">B</a><a href="/">Home</a><a href="/c">C</a>"#)
            .page("http://site.test/b", r#"<a href="/a">A</a><a href="/c">C</a>"#)
            .page("http://site.test/c", r#"<a href="/">Home</a>"#);
        let engine = engine(site, ".css", IterationBudget::Unbounded);
        let report = engine.run().await;

        let mut requests = engine.fetcher.requests();
        let total = requests.len();
        requests.sort();
        requests.dedup();
        assert_eq!(requests.len(), total);

        assert_eq!(
            pages(&report),
            vec![ROOT, "http://site.test/a", "http://site.test/b", "http://site.test/c"]
        );
        assert_eq!(report.iterations, 3);
        assert_eq!(report.termination, Termination::FrontierExhausted);
    }

    #[tokio::test]
    async fn test_first_occurrence_in_iteration_order_wins() {
        let site = StaticSite::default()
            .page(ROOT, r#"<a href="/b">B</a><a href="/a">A</a>"#)
            .page("http://site.test/b", r#"<a href="/d">D</a><a href="/c">C</a>"#)
            .page("http://site.test/a", r#"<a href="/c">C</a><a href="/e">E</a>"#);
        let report = engine(site, ".css", limited(2)).run().await;

        assert_eq!(
            visited(&report),
            vec![
                ROOT,
                "http://site.test/b",
                "http://site.test/a",
                "http://site.test/d",
                "http://site.test/c",
                "http://site.test/e",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_pages_still_get_an_entry() {
        let site = StaticSite::default()
            .page(ROOT, r#"<a href="/broken">x</a><a href="/image.png">y</a><a href="/ok">z</a>"#)
            .failing("http://site.test/broken", FetchError::Status(500))
            .binary("http://site.test/image.png")
            .page("http://site.test/ok", r#"<img src="/ok.png">"#);
        let report = engine(site, ".png", IterationBudget::Unbounded).run().await;

        assert_eq!(report.failed_pages, 2);
        assert_eq!(
            report.manifest,
            vec![
                ManifestEntry { url: ROOT.to_string(), assets: Vec::new() },
                ManifestEntry { url: "http://site.test/broken".to_string(), assets: Vec::new() },
                ManifestEntry { url: "http://site.test/image.png".to_string(), assets: Vec::new() },
                ManifestEntry {
                    url: "http://site.test/ok".to_string(),
                    assets: vec!["http://site.test/ok.png".to_string()],
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_unreachable_root_is_not_fatal() {
        let site = StaticSite::default().failing(ROOT, FetchError::Timeout);
        let report = engine(site, ".css", IterationBudget::Unbounded).run().await;

        assert_eq!(report.manifest.len(), 1);
        assert_eq!(report.failed_pages, 1);
        assert_eq!(report.termination, Termination::FrontierExhausted);
    }

    #[tokio::test]
    async fn test_concurrent_fetch_keeps_frontier_order() {
        let site = StaticSite::default()
            .page(ROOT, r#"<a href="/slow">1</a><a href="/fast">2</a>"#)
            .page("http://site.test/slow", r#"<a href="/x">x</a>"#)
            .page("http://site.test/fast", r#"<a href="/y">y</a><a href="/x">x</a>"#)
            .slow("http://site.test/slow", 100);
        let config = CrawlConfig::new(ROOT, parse_asset_spec(".css"), limited(2))
            .unwrap()
            .with_concurrency(4);
        let report = CrawlEngine::new(config, site).run().await;

        assert_eq!(pages(&report), vec![ROOT, "http://site.test/slow", "http://site.test/fast"]);
        assert_eq!(
            visited(&report),
            vec![ROOT, "http://site.test/slow", "http://site.test/fast", "http://site.test/x", "http://site.test/y"]
        );
    }

    #[tokio::test]
    async fn test_engine_can_run_twice() {
        let site = StaticSite::default()
            .page(ROOT, r#"<a href="/a">A</a>"#)
            .page("http://site.test/a", r#"<img src="/a.png">"#);
        let engine = engine(site, ".png", IterationBudget::Unbounded);

        let first = engine.run().await;
        let second = engine.run().await;

        assert_eq!(first.manifest, second.manifest);
        assert_eq!(first.visited, second.visited);
        assert_eq!(engine.fetcher.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_report_properties() {
        let site = StaticSite::default()
            .page(
                ROOT,
                r#"
                <link href="/main.css"><script src="https://cdn.test/lib.js"></script>
                <a href="/a">A</a><a href="https://elsewhere.test/">out</a><a href="http://site.test/b">B</a>
                "#,
            )
            .page("http://site.test/a", r#"<img src="/a.jpg"><img src="/a.gif"><a href="/b">B</a>"#)
            .page("http://site.test/b", r#"<script src="/b.js"></script><a href="/">home</a>"#);
        let engine = engine(site, ".css,.js,.jpg", IterationBudget::Unbounded);
        let patterns = engine.config().asset_spec().to_vec();
        let report = engine.run().await;

        for url in report.visited.iter().skip(1) {
            assert!(in_domain(ROOT, url), "{} escaped the domain", url);
        }
        for entry in &report.manifest {
            for asset in &entry.assets {
                assert!(is_asset(asset, patterns.as_slice()), "{} is not an asset", asset);
            }
        }
        assert_eq!(report.manifest.len(), report.visited.len());
    }

    #[tokio::test]
    async fn test_inspect_single_page() {
        let site = StaticSite::default().page(ROOT, r#"<a href="/a">A</a><img src="/logo.png">"#);
        let refs = engine(site, ".png", IterationBudget::default())
            .inspect(ROOT)
            .await
            .unwrap();

        assert_eq!(refs.links, vec!["http://site.test/a"]);
        assert_eq!(refs.assets, vec!["http://site.test/logo.png"]);
    }
}
