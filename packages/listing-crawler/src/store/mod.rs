//! Persistence traits and storage backends.
//!
//! The [`LinkStore`] trait is the crawl-state tracker contract: URL
//! deduplication and the one-way visited transition. [`ListingStore`]
//! holds the raw and typed listing rows. Both are implemented by
//! [`SqliteStore`] for real runs and [`MemoryStore`] for tests.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{RawRecord, TypedRecord};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Crawl-state tracking over discovered listing URLs.
///
/// Every mutation is a single atomic statement: it either fully applies
/// or surfaces an error, never partial state.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Insert `url` unvisited if not already known.
    ///
    /// Returns `true` iff the URL was inserted. A duplicate is expected
    /// steady-state, reported as `false`, never an error.
    async fn register_link(&self, url: &str) -> StoreResult<bool>;

    /// URLs still to harvest: unvisited AND without a raw record.
    ///
    /// The raw-record anti-join makes interrupted runs safe: a URL whose
    /// extraction failed before being marked visited is retried, one
    /// already recorded is skipped even if its flag never got flipped.
    async fn pending_links(&self) -> StoreResult<Vec<String>>;

    /// Flip `url` to visited. Idempotent; a no-op on unknown URLs.
    async fn mark_visited(&self, url: &str) -> StoreResult<()>;
}

/// Storage for raw and typed listing records.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Insert the raw record for a freshly harvested listing.
    async fn insert_raw(&self, record: &RawRecord) -> StoreResult<()>;

    /// Insert the typed record derived from a raw one.
    async fn insert_listing(&self, record: &TypedRecord) -> StoreResult<()>;

    /// Raw records that have no typed counterpart yet, so the clean
    /// phase can resume where it left off.
    async fn unprocessed_raw(&self) -> StoreResult<Vec<RawRecord>>;
}
