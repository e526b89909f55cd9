// src/fetch/mod.rs
// =============================================================================
// This module defines how pages are downloaded.
//
// The crawl engine only knows about the Fetcher trait, so tests can hand it
// an in-memory site while the CLI hands it the reqwest-backed HttpFetcher.
//
// Rust concepts:
// - Traits: an interface the engine is generic over
// - async-trait: lets a trait have async methods and still be used as a
//   generic bound or trait object
// - thiserror: derives Display/Error for our FetchError enum
// =============================================================================

mod http;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpFetcher;

/// A successfully downloaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: String,
    /// Response body as text
    pub body: String,
    /// Value of the Content-Type header, if the server sent one
    pub content_type: Option<String>,
}

// Why a page couldn't be downloaded.
//
// The crawl treats every variant the same way (the page yields nothing), the
// variants only exist so logs say what went wrong.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("could not read response body: {0}")]
    Body(String),

    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Downloads `url`, failing on network errors and non-2xx responses.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}
