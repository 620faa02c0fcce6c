//! Record types flowing through the pipeline.
//!
//! Each stage owns its output: extraction produces a [`RawRecord`],
//! normalization derives a [`TypedRecord`] from it. Neither is mutated
//! after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unprocessed string fields extracted from one listing page.
///
/// Every field except `url` is best-effort: a lookup chain that found
/// nothing leaves the field `None`. `image_count` is the stringified
/// slide count and is always present on a successfully parsed page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Listing URL (unique key)
    pub url: String,

    /// "post id: NNN" marker text, or digits recovered from the URL path
    pub post_id: Option<String>,

    /// Price text verbatim, currency symbol retained
    pub price: Option<String>,

    /// Posting body text, or a raw markup dump when text lookup failed
    pub description: Option<String>,

    /// Number of image slides, as a string
    pub image_count: Option<String>,

    /// Relative timestamp as displayed ("3 days ago")
    pub post_time: Option<String>,

    /// Canonical page title metadata
    pub title: Option<String>,

    /// Geo placename metadata
    pub placename: Option<String>,

    /// Geo position metadata ("lat;lon")
    pub latlon: Option<String>,

    /// Small-print location under the posting title
    pub location: Option<String>,

    /// Housing info block text ("2br - 900ft2")
    pub housing: Option<String>,

    /// Attribute block paragraphs, joined and whitespace-collapsed
    pub attrs: Option<String>,

    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,
}

impl RawRecord {
    /// Create an empty record for a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            post_id: None,
            price: None,
            description: None,
            image_count: None,
            post_time: None,
            title: None,
            placename: None,
            latlon: None,
            location: None,
            housing: None,
            attrs: None,
            fetched_at: Utc::now(),
        }
    }

    /// Set the fetched timestamp.
    pub fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = fetched_at;
        self
    }
}

/// Typed, cleaned listing derived from exactly one [`RawRecord`].
///
/// `lat` and `lon` are either both present or both absent. `housing` and
/// `attrs` hold the normalized text, not the raw extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedRecord {
    /// Listing URL (unique key)
    pub url: String,

    /// Post id with the label stripped
    pub post_id: Option<String>,

    /// Numeric price
    pub price: Option<f64>,

    /// Cleaned posting body
    pub description: Option<String>,

    /// Number of image slides
    pub image_count: Option<i64>,

    /// Relative timestamp, passed through
    pub post_time: Option<String>,

    /// Cleaned title
    pub title: Option<String>,

    /// Cleaned placename
    pub placename: Option<String>,

    /// Latitude (paired with `lon`)
    pub lat: Option<f64>,

    /// Longitude (paired with `lat`)
    pub lon: Option<f64>,

    /// Location with parentheses stripped
    pub location: Option<String>,

    /// Normalized housing text
    pub housing: Option<String>,

    /// Normalized attribute text, amenity phrases removed
    pub attrs: Option<String>,

    /// Bedroom count (housing first, then attrs)
    pub beds: Option<i64>,

    /// Square footage (housing first, then attrs)
    pub sqft: Option<i64>,

    /// Dogs-allowed flag; `None` when `attrs` was absent
    pub dogs_ok: Option<bool>,

    /// Cats-allowed flag; `None` when `attrs` was absent
    pub cats_ok: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_empty() {
        let record = RawRecord::new("https://example.org/apa/123.html");
        assert_eq!(record.url, "https://example.org/apa/123.html");
        assert!(record.post_id.is_none());
        assert!(record.price.is_none());
        assert!(record.attrs.is_none());
    }
}
