//! Crawler configuration: phase toggles, pacing, and search sweeps.

use std::time::Duration;

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Number of plain result pages to walk when no sweep is supplied
    pub search_pages: usize,

    /// Pacing delay after each search-result page fetch
    pub discovery_delay: Duration,

    /// Pacing delay after each listing page fetch
    pub listing_delay: Duration,

    /// Run the link discovery phase
    pub discover: bool,

    /// Run the listing harvest phase
    pub harvest: bool,

    /// Run the normalization phase
    pub clean: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            search_pages: 10,
            discovery_delay: Duration::from_millis(500),
            listing_delay: Duration::from_millis(500),
            discover: true,
            harvest: true,
            clean: true,
        }
    }
}

impl CrawlerConfig {
    /// Create a config with default pacing and all phases enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of plain result pages.
    pub fn with_search_pages(mut self, pages: usize) -> Self {
        self.search_pages = pages;
        self
    }

    /// Set both pacing delays at once.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.discovery_delay = delay;
        self.listing_delay = delay;
        self
    }

    /// Set the discovery pacing delay.
    pub fn with_discovery_delay(mut self, delay: Duration) -> Self {
        self.discovery_delay = delay;
        self
    }

    /// Set the listing pacing delay.
    pub fn with_listing_delay(mut self, delay: Duration) -> Self {
        self.listing_delay = delay;
        self
    }

    /// Skip the link discovery phase.
    pub fn skip_discovery(mut self) -> Self {
        self.discover = false;
        self
    }

    /// Skip the listing harvest phase.
    pub fn skip_harvest(mut self) -> Self {
        self.harvest = false;
        self
    }

    /// Skip the normalization phase.
    pub fn skip_clean(mut self) -> Self {
        self.clean = false;
        self
    }
}

/// Generates a sweep of search-result URLs over price and square-footage
/// bands.
///
/// Narrow filter bands work around result caps on the search endpoint:
/// each band is paged independently, so listings beyond the global cap
/// are still reachable.
#[derive(Debug, Clone)]
pub struct SearchSweep {
    /// Base search URL, without query parameters
    pub base_url: String,

    /// Width of one price band, in whole currency units
    pub price_step: u32,

    /// Number of price bands
    pub price_bands: u32,

    /// Width of one square-footage band
    pub sqft_step: u32,

    /// Number of square-footage bands
    pub sqft_bands: u32,

    /// Result pages fetched per band combination
    pub pages_per_band: u32,

    /// Listings per result page (the page offset stride)
    pub page_size: u32,
}

impl SearchSweep {
    /// Create a sweep with the default band layout: 12 price bands of 500,
    /// 8 square-footage bands of 200, 30 pages per combination.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            price_step: 500,
            price_bands: 12,
            sqft_step: 200,
            sqft_bands: 8,
            pages_per_band: 30,
            page_size: 120,
        }
    }

    /// Set the price band layout.
    pub fn with_price_bands(mut self, bands: u32, step: u32) -> Self {
        self.price_bands = bands;
        self.price_step = step;
        self
    }

    /// Set the square-footage band layout.
    pub fn with_sqft_bands(mut self, bands: u32, step: u32) -> Self {
        self.sqft_bands = bands;
        self.sqft_step = step;
        self
    }

    /// Set pages per band combination.
    pub fn with_pages_per_band(mut self, pages: u32) -> Self {
        self.pages_per_band = pages;
        self
    }

    /// All search-result URLs in the sweep, one per (sqft band, price
    /// band, page offset) combination.
    pub fn urls(&self) -> Vec<String> {
        let mut urls = Vec::new();
        for s in 0..self.sqft_bands {
            let (min_sqft, max_sqft) = (s * self.sqft_step, (s + 1) * self.sqft_step);
            for p in 0..self.price_bands {
                let (min_price, max_price) = (p * self.price_step, (p + 1) * self.price_step);
                for i in 0..self.pages_per_band {
                    urls.push(format!(
                        "{}?s={}&availabilityMode=0&bundleDuplicates=1&maxSqft={}&max_price={}&minSqft={}&min_price={}",
                        self.base_url,
                        i * self.page_size,
                        max_sqft,
                        max_price,
                        min_sqft,
                        min_price,
                    ));
                }
            }
        }
        urls
    }

    /// The first `n` unfiltered result pages, offset by page size.
    pub fn pages(&self, n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("{}?s={}", self.base_url, i as u32 * self.page_size))
            .collect()
    }
}
