//! Classifieds listing crawler.
//!
//! Crawls a classifieds site in three resumable stages: discover listing
//! URLs from search-result pages, harvest each listing into a raw record
//! of best-effort string fields, and normalize those into typed rows
//! suitable for analysis.
//!
//! # Design
//!
//! - Crawl state lives in the store: URLs are registered once, flipped to
//!   visited after a successful harvest, and never reprocessed. Re-running
//!   the pipeline after any interruption is safe.
//! - Extraction is best-effort per field: each field has an independent
//!   lookup chain and a missing field is `None`, not an error.
//! - Normalization is pure and total: unparsable input degrades to `None`,
//!   never a panic or a partial value.
//!
//! # Usage
//!
//! ```rust,ignore
//! use listing_crawler::{CrawlerConfig, HttpFetcher, Pipeline, SearchSweep, SqliteStore};
//!
//! let store = SqliteStore::new("sqlite://listings.db?mode=rwc").await?;
//! let fetcher = HttpFetcher::new()?;
//! let pipeline = Pipeline::new(fetcher, store, CrawlerConfig::new());
//!
//! let sweep = SearchSweep::new("https://newyork.example.org/search/apa");
//! let stats = pipeline.run(&sweep.urls()).await?;
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod store;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use config::{CrawlerConfig, SearchSweep};
pub use discovery::listing_links;
pub use error::{CrawlerError, ExtractError, FetchError, StoreError};
pub use extract::{extract_listing, Field, FieldRule, Lookup, FIELD_RULES};
pub use fetch::{Fetcher, HttpFetcher};
pub use normalize::{normalize_record, NormalizedAttrs};
pub use pipeline::{CleanStats, DiscoveryStats, HarvestStats, Pipeline, RunStats};
pub use store::{LinkStore, ListingStore, MemoryStore, SqliteStore};
pub use types::{RawRecord, TypedRecord};
