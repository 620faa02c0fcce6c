//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::store::{LinkStore, ListingStore};
use crate::types::{RawRecord, TypedRecord};

/// In-memory store for links and listings.
///
/// Useful for testing and development. Not suitable for real crawls as
/// data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    links: RwLock<HashMap<String, bool>>,
    raw: RwLock<HashMap<String, RawRecord>>,
    listings: RwLock<HashMap<String, TypedRecord>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of known links.
    pub fn link_count(&self) -> usize {
        self.links.read().unwrap().len()
    }

    /// Number of raw records.
    pub fn raw_count(&self) -> usize {
        self.raw.read().unwrap().len()
    }

    /// Number of typed records.
    pub fn listing_count(&self) -> usize {
        self.listings.read().unwrap().len()
    }

    /// Whether a link is flagged visited.
    pub fn is_visited(&self, url: &str) -> bool {
        self.links.read().unwrap().get(url).copied().unwrap_or(false)
    }

    /// Fetch a typed record by URL.
    pub fn listing(&self, url: &str) -> Option<TypedRecord> {
        self.listings.read().unwrap().get(url).cloned()
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn register_link(&self, url: &str) -> StoreResult<bool> {
        let mut links = self.links.write().unwrap();
        if links.contains_key(url) {
            return Ok(false);
        }
        links.insert(url.to_string(), false);
        Ok(true)
    }

    async fn pending_links(&self) -> StoreResult<Vec<String>> {
        let raw = self.raw.read().unwrap();
        let mut pending: Vec<String> = self
            .links
            .read()
            .unwrap()
            .iter()
            .filter(|(url, visited)| !**visited && !raw.contains_key(*url))
            .map(|(url, _)| url.clone())
            .collect();
        pending.sort();
        Ok(pending)
    }

    async fn mark_visited(&self, url: &str) -> StoreResult<()> {
        if let Some(visited) = self.links.write().unwrap().get_mut(url) {
            *visited = true;
        }
        Ok(())
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn insert_raw(&self, record: &RawRecord) -> StoreResult<()> {
        self.raw
            .write()
            .unwrap()
            .insert(record.url.clone(), record.clone());
        Ok(())
    }

    async fn insert_listing(&self, record: &TypedRecord) -> StoreResult<()> {
        self.listings
            .write()
            .unwrap()
            .insert(record.url.clone(), record.clone());
        Ok(())
    }

    async fn unprocessed_raw(&self) -> StoreResult<Vec<RawRecord>> {
        let listings = self.listings.read().unwrap();
        let mut unprocessed: Vec<RawRecord> = self
            .raw
            .read()
            .unwrap()
            .values()
            .filter(|record| !listings.contains_key(&record.url))
            .cloned()
            .collect();
        unprocessed.sort_by(|a, b| a.url.cmp(&b.url));
        Ok(unprocessed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_pending() {
        let store = MemoryStore::new();

        assert!(store.register_link("https://example.org/apa/1.html").await.unwrap());
        assert!(!store.register_link("https://example.org/apa/1.html").await.unwrap());
        assert_eq!(store.link_count(), 1);

        store.mark_visited("https://example.org/apa/1.html").await.unwrap();
        assert!(store.pending_links().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pending_excludes_recorded() {
        let store = MemoryStore::new();
        store.register_link("https://example.org/apa/1.html").await.unwrap();
        store
            .insert_raw(&RawRecord::new("https://example.org/apa/1.html"))
            .await
            .unwrap();

        assert!(store.pending_links().await.unwrap().is_empty());
        assert!(!store.is_visited("https://example.org/apa/1.html"));
    }
}
