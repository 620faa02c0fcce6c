//! Typed errors for the listing crawler.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can abort a pipeline phase.
#[derive(Debug, Error)]
pub enum CrawlerError {
    /// Fetch operation failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Page extraction failed
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Errors that can occur while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (network, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP status {status} fetching {url}")]
    Status { status: u16, url: String },
}

/// Errors that can occur while extracting fields from a page.
///
/// A missing or malformed field is never an error; only a page that
/// cannot be parsed at all is.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Fetched body is empty or not a parseable document
    #[error("unparseable page: {url}")]
    UnparseablePage { url: String },
}

/// Errors that can occur in the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database query or transaction failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored row could not be decoded
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
