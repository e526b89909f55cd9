// src/config.rs
// =============================================================================
// This module holds the resolved crawl configuration.
//
// What lives here:
// - CrawlConfig: the immutable input to one crawl (root, asset spec, budget)
// - IterationBudget: how many frontier-expansion rounds the crawl may run
// - parse_asset_spec: turns "a,b,c" into an ordered list of patterns
// - ConfigError: everything that stops a crawl before it starts
//
// Rust concepts:
// - Newtype-ish validation: the only way to get a CrawlConfig is through
//   CrawlConfig::new, so every config in the program has been checked
// - FromStr: lets clap parse IterationBudget straight from the command line
// - Builder methods: with_*(mut self, ..) -> Self for optional tunables
// =============================================================================

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Asset patterns used when the caller doesn't provide any.
pub const DEFAULT_ASSET_SPEC: &str = ".png,.jpg,.jpeg,.js,.css";

const DEFAULT_CONCURRENCY: usize = 8;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_USER_AGENT: &str = concat!("asset-crawler/", env!("CARGO_PKG_VERSION"));

/// Reasons a crawl refuses to start.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("root URL is empty")]
    EmptyRoot,

    #[error("invalid root URL '{url}': {reason}")]
    InvalidRoot { url: String, reason: String },

    #[error("unsupported scheme '{0}' (only http and https can be crawled)")]
    UnsupportedScheme(String),

    #[error("asset specification is empty")]
    EmptyAssetSpec,

    #[error("invalid iteration budget '{0}' (expected a positive integer or 'unbounded')")]
    InvalidBudget(String),
}

// How many times the crawl loop may expand the frontier.
//
// Limited(n) stops after n iterations, Unbounded keeps going until no new
// in-domain links are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationBudget {
    Limited(NonZeroUsize),
    Unbounded,
}

impl IterationBudget {
    /// Returns true once `iterations` rounds have used up the budget.
    pub fn is_exhausted(&self, iterations: usize) -> bool {
        match self {
            IterationBudget::Limited(limit) => iterations >= limit.get(),
            IterationBudget::Unbounded => false,
        }
    }
}

impl Default for IterationBudget {
    fn default() -> Self {
        IterationBudget::Limited(NonZeroUsize::MIN)
    }
}

impl FromStr for IterationBudget {
    type Err = ConfigError;

    // Accepts "3", "unbounded", and any negative number (the legacy
    // "-1" sentinel and friends), which also means no limit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if trimmed.eq_ignore_ascii_case("unbounded") {
            return Ok(IterationBudget::Unbounded);
        }

        match trimmed.parse::<i64>() {
            Ok(n) if n < 0 => Ok(IterationBudget::Unbounded),
            Ok(n) => usize::try_from(n)
                .ok()
                .and_then(NonZeroUsize::new)
                .map(IterationBudget::Limited)
                .ok_or_else(|| ConfigError::InvalidBudget(s.to_string())),
            Err(_) => Err(ConfigError::InvalidBudget(s.to_string())),
        }
    }
}

impl fmt::Display for IterationBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IterationBudget::Limited(limit) => write!(f, "{}", limit),
            IterationBudget::Unbounded => write!(f, "unbounded"),
        }
    }
}

// Splits a comma-separated asset specification into an ordered set.
//
// Example:
//   " .png, .css,,.png" -> [".png", ".css"]
//
// Whitespace around items is trimmed, empty items are dropped and repeated
// patterns keep their first position.
pub fn parse_asset_spec(spec: &str) -> Vec<String> {
    let mut patterns: Vec<String> = Vec::new();

    for item in spec.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        if !patterns.iter().any(|existing| existing == item) {
            patterns.push(item.to_string());
        }
    }

    patterns
}

/// Immutable, validated input for one crawl.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    root: String,
    asset_spec: Vec<String>,
    budget: IterationBudget,
    concurrency: usize,
    timeout: Duration,
    user_agent: String,
    resolve_relative: bool,
}

impl CrawlConfig {
    // Validates the inputs and builds a config.
    //
    // The root keeps the caller's spelling (plus a trailing '/'), rather than
    // the url crate's re-serialization, because domain containment is a plain
    // text prefix test against exactly this string.
    pub fn new(
        root: &str,
        asset_spec: Vec<String>,
        budget: IterationBudget,
    ) -> Result<Self, ConfigError> {
        let root = root.trim();
        if root.is_empty() {
            return Err(ConfigError::EmptyRoot);
        }

        let parsed = Url::parse(root).map_err(|e| ConfigError::InvalidRoot {
            url: root.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        if asset_spec.iter().all(|pattern| pattern.is_empty()) {
            return Err(ConfigError::EmptyAssetSpec);
        }

        let root = if root.ends_with('/') {
            root.to_string()
        } else {
            format!("{}/", root)
        };

        Ok(Self {
            root,
            asset_spec: asset_spec.into_iter().filter(|p| !p.is_empty()).collect(),
            budget,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            resolve_relative: false,
        })
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Resolve every relative reference (`img/a.png`, `/about`, `//cdn/x.js`) against the page URL.
    pub fn with_relative_resolution(mut self, enabled: bool) -> Self {
        self.resolve_relative = enabled;
        self
    }

    /// The crawl root, always ending in '/'.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn asset_spec(&self) -> &[String] {
        &self.asset_spec
    }

    pub fn budget(&self) -> IterationBudget {
        self.budget
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn resolve_relative(&self) -> bool {
        self.resolve_relative
    }
}
