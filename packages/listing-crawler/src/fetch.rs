//! Fetcher trait and the reqwest-backed HTTP implementation.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{FetchError, FetchResult};

/// Transport abstraction: fetch a URL and return its markup.
///
/// A failed fetch is transient by contract: the caller skips the URL for
/// the current pass without mutating crawl state.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a single page and return the response body.
    async fn fetch(&self, url: &str) -> FetchResult<String>;
}

/// HTTP fetcher using reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with browser-like headers and a 30 s timeout.
    pub fn new() -> FetchResult<Self> {
        // A browser-like User-Agent avoids trivial bot rejection
        let user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(accept) =
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".parse()
        {
            headers.insert(reqwest::header::ACCEPT, accept);
        }
        if let Ok(lang) = "en-US,en;q=0.5".parse() {
            headers.insert(reqwest::header::ACCEPT_LANGUAGE, lang);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))
    }
}
