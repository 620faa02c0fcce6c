//! Pipeline driver: discover → harvest → clean.
//!
//! Stages are discrete and independently callable; `run` composes them
//! under the configured phase toggles. Processing is sequential with a
//! pacing delay after every fetch. The whole pipeline is crash-safe:
//! re-running picks up wherever the previous run stopped.

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::CrawlerConfig;
use crate::discovery;
use crate::error::Result;
use crate::extract::extract_listing;
use crate::fetch::Fetcher;
use crate::normalize::normalize_record;
use crate::store::{LinkStore, ListingStore};

/// Counts from the link discovery phase.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryStats {
    /// Search-result pages fetched and parsed
    pub pages_fetched: usize,

    /// Search-result pages that failed to fetch
    pub pages_failed: usize,

    /// Listing URLs newly registered
    pub links_registered: usize,

    /// Listing URLs already known
    pub links_duplicate: usize,
}

/// Counts from the listing harvest phase.
#[derive(Debug, Clone, Default)]
pub struct HarvestStats {
    /// Listings fetched, extracted, and recorded
    pub listings_recorded: usize,

    /// Listings skipped this pass (fetch or parse failure); they stay
    /// unvisited and are retried on the next run
    pub listings_failed: usize,
}

/// Counts from the normalization phase.
#[derive(Debug, Clone, Default)]
pub struct CleanStats {
    /// Raw records normalized into typed rows
    pub records_cleaned: usize,
}

/// Aggregate counts for a full run; phases that were toggled off are
/// `None`.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub discovery: Option<DiscoveryStats>,
    pub harvest: Option<HarvestStats>,
    pub clean: Option<CleanStats>,
}

/// The three-stage crawl pipeline.
pub struct Pipeline<F, S> {
    fetcher: F,
    store: S,
    config: CrawlerConfig,
}

impl<F, S> Pipeline<F, S>
where
    F: Fetcher,
    S: LinkStore + ListingStore,
{
    /// Create a pipeline over a fetcher and a store.
    pub fn new(fetcher: F, store: S, config: CrawlerConfig) -> Self {
        Self {
            fetcher,
            store,
            config,
        }
    }

    /// Get the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Discovery phase: fetch each search-result page and register the
    /// listing links it contains.
    ///
    /// A page that fails to fetch is counted and skipped; registration
    /// failures abort the phase since losing a write would corrupt
    /// crawl state.
    pub async fn discover(&self, search_urls: &[String]) -> Result<DiscoveryStats> {
        let mut stats = DiscoveryStats::default();
        info!("Discovering listings from {} search pages", search_urls.len());

        for url in search_urls {
            match self.fetcher.fetch(url).await {
                Ok(body) => {
                    stats.pages_fetched += 1;
                    for link in discovery::listing_links(url, &body) {
                        if self.store.register_link(&link).await? {
                            stats.links_registered += 1;
                        } else {
                            stats.links_duplicate += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!("Failed to fetch search page {}: {}", url, e);
                    stats.pages_failed += 1;
                }
            }
            sleep(self.config.discovery_delay).await;
        }

        info!(
            "Discovery complete: {} pages, {} new links, {} duplicates, {} failed pages",
            stats.pages_fetched, stats.links_registered, stats.links_duplicate, stats.pages_failed
        );
        Ok(stats)
    }

    /// Harvest phase: fetch every pending listing, extract its raw
    /// fields, and mark it visited.
    ///
    /// A fetch or parse failure leaves the URL unvisited for the next
    /// pass. The visited flip happens only after the raw record landed,
    /// so an interruption between the two is recovered by the
    /// pending-links anti-join.
    pub async fn harvest(&self) -> Result<HarvestStats> {
        let mut stats = HarvestStats::default();
        let pending = self.store.pending_links().await?;
        info!("Harvesting {} pending listings", pending.len());

        for url in &pending {
            match self.fetcher.fetch(url).await {
                Ok(body) => match extract_listing(url, &body) {
                    Ok(record) => {
                        self.store.insert_raw(&record).await?;
                        self.store.mark_visited(url).await?;
                        stats.listings_recorded += 1;
                        debug!("Recorded {}", url);
                    }
                    Err(e) => {
                        warn!("Skipping {}: {}", url, e);
                        stats.listings_failed += 1;
                    }
                },
                Err(e) => {
                    warn!("Failed to fetch listing {}: {}", url, e);
                    stats.listings_failed += 1;
                }
            }
            sleep(self.config.listing_delay).await;
        }

        info!(
            "Harvest complete: {} recorded, {} failed",
            stats.listings_recorded, stats.listings_failed
        );
        Ok(stats)
    }

    /// Normalization phase: derive a typed record from every raw record
    /// that does not have one yet.
    pub async fn clean(&self) -> Result<CleanStats> {
        let mut stats = CleanStats::default();
        let unprocessed = self.store.unprocessed_raw().await?;
        info!("Normalizing {} raw records", unprocessed.len());

        for record in &unprocessed {
            let typed = normalize_record(record);
            self.store.insert_listing(&typed).await?;
            stats.records_cleaned += 1;
        }

        info!("Normalization complete: {} records", stats.records_cleaned);
        Ok(stats)
    }

    /// Run the enabled phases in order.
    pub async fn run(&self, search_urls: &[String]) -> Result<RunStats> {
        let mut stats = RunStats::default();

        if self.config.discover {
            stats.discovery = Some(self.discover(search_urls).await?);
        } else {
            info!("Skipping discovery phase");
        }

        if self.config.harvest {
            stats.harvest = Some(self.harvest().await?);
        } else {
            info!("Skipping harvest phase");
        }

        if self.config.clean {
            stats.clean = Some(self.clean().await?);
        } else {
            info!("Skipping normalization phase");
        }

        Ok(stats)
    }
}
