// src/fetch/http.rs
// =============================================================================
// The real fetch provider, built on reqwest.
//
// Key functionality:
// - One shared Client (connection pooling) with a timeout and user agent
// - GET the page, treat any non-2xx status as a failure
// - Sort reqwest errors into FetchError variants (timeout, connect, ...)
//
// Redirects are followed by reqwest itself (up to 5); the crawl never sees
// the intermediate hops.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect, Client};

use super::{FetchError, FetchedPage, Fetcher};
use crate::config::CrawlConfig;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds the HTTP client from the crawl settings.
    //
    // Client::build only fails if the TLS backend can't initialise, which we
    // report to the caller instead of panicking.
    pub fn new(config: &CrawlConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .redirect(redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Other(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await.map_err(categorize_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        Ok(FetchedPage {
            url: url.to_string(),
            body,
            content_type,
        })
    }
}

// Maps a reqwest error onto our error kinds
fn categorize_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else if error.is_redirect() {
        FetchError::Other("too many redirects".to_string())
    } else {
        FetchError::Other(error.to_string())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why #[async_trait]?
//    - The Fetcher trait has an async method and the engine is generic over it
//    - async_trait boxes the returned future so the trait stays simple to use
//
// 2. Why keep one Client?
//    - reqwest::Client holds a connection pool
//    - Building one per request would reconnect for every page
// -----------------------------------------------------------------------------
