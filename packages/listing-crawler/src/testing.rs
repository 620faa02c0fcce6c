//! Testing utilities: a mock fetcher and listing-page fixtures.
//!
//! Useful for exercising the pipeline without network access.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::sync::RwLock;

use crate::error::{FetchError, FetchResult};
use crate::fetch::Fetcher;

/// A mock fetcher serving canned pages from memory.
///
/// URLs registered with [`MockFetcher::with_failure`] return a transient
/// HTTP error instead. Every call is recorded for assertions.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    failures: HashSet<String>,
    calls: RwLock<Vec<String>>,
}

impl MockFetcher {
    /// Create an empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    /// Fail every fetch of `url` with an HTTP 500.
    pub fn with_failure(mut self, url: impl Into<String>) -> Self {
        self.failures.insert(url.into());
        self
    }

    /// URLs fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Number of fetches of a specific URL.
    pub fn fetch_count(&self, url: &str) -> usize {
        self.calls.read().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        self.calls.write().unwrap().push(url.to_string());

        if self.failures.contains(url) {
            return Err(FetchError::Status {
                status: 500,
                url: url.to_string(),
            });
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

/// Content slots for a rendered listing page.
///
/// `None` omits the corresponding element entirely, simulating the
/// structural variation between real listings.
#[derive(Debug, Clone)]
pub struct ListingFixture {
    /// Post id digits, rendered as "post id: NNN" in the posting infos
    pub post_id: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub image_count: usize,
    pub post_time: Option<String>,
    pub title: Option<String>,
    pub placename: Option<String>,
    pub latlon: Option<String>,
    pub location: Option<String>,
    pub housing: Option<String>,
    pub attr_paragraphs: Vec<String>,
}

impl Default for ListingFixture {
    fn default() -> Self {
        Self {
            post_id: Some("7001234567".to_string()),
            price: Some("$1,950".to_string()),
            description: Some(
                "QR Code Link to This Post\n        Sunny two bedroom near the park!".to_string(),
            ),
            image_count: 3,
            post_time: Some("3 days ago".to_string()),
            title: Some("Sunny 2BR near park".to_string()),
            placename: Some("Brooklyn".to_string()),
            latlon: Some("40.7;-74.0".to_string()),
            location: Some("(Park Slope)".to_string()),
            housing: Some("2br - 900ft2".to_string()),
            attr_paragraphs: vec![
                "apartment".to_string(),
                "laundry in bldg".to_string(),
                "dogs are ok - wooof".to_string(),
                "(google map)".to_string(),
            ],
        }
    }
}

/// Render a listing page in the markup shape the extractor expects.
pub fn listing_page(fixture: &ListingFixture) -> String {
    let mut html = String::from("<html><head>\n");

    if let Some(title) = &fixture.title {
        let _ = writeln!(html, r#"<meta property="og:title" content="{}">"#, title);
    }
    if let Some(placename) = &fixture.placename {
        let _ = writeln!(html, r#"<meta name="geo.placename" content="{}">"#, placename);
    }
    if let Some(latlon) = &fixture.latlon {
        let _ = writeln!(html, r#"<meta name="geo.position" content="{}">"#, latlon);
    }

    html.push_str("</head><body>\n");

    html.push_str(r#"<div class="postingtitle"><p class="postingtitletext">"#);
    if let Some(price) = &fixture.price {
        let _ = write!(html, r#"<span class="price">{}</span> "#, price);
    }
    if let Some(housing) = &fixture.housing {
        let _ = write!(html, r#"<span class="housing">{}</span> "#, housing);
    }
    if let Some(location) = &fixture.location {
        let _ = write!(html, "<small>{}</small>", location);
    }
    html.push_str("</p></div>\n");

    for i in 0..fixture.image_count {
        let _ = writeln!(html, r#"<div class="slide"><img src="image{}.jpg"></div>"#, i);
    }

    if let Some(description) = &fixture.description {
        let _ = writeln!(html, r#"<section id="postingbody">{}</section>"#, description);
    }

    if !fixture.attr_paragraphs.is_empty() {
        html.push_str(r#"<div class="mapAndAttrs">"#);
        for paragraph in &fixture.attr_paragraphs {
            let _ = write!(html, r#"<p class="attrgroup">{}</p>"#, paragraph);
        }
        html.push_str("</div>\n");
    }

    if let Some(post_time) = &fixture.post_time {
        let _ = writeln!(
            html,
            r#"<p class="postinginfo">posted: <time class="timeago" datetime="2020-01-01T00:00:00">{}</time></p>"#,
            post_time
        );
    }
    if let Some(post_id) = &fixture.post_id {
        let _ = writeln!(html, r#"<p class="postinginfo">post id: {}</p>"#, post_id);
    }

    html.push_str("</body></html>\n");
    html
}

/// Render a search-result page with one result row per link.
pub fn search_page(links: &[&str]) -> String {
    let mut html = String::from(r#"<html><body><ul class="rows">"#);
    for (i, link) in links.iter().enumerate() {
        let _ = write!(
            html,
            r#"<li class="result-row"><a class="result-title" href="{}">listing {}</a></li>"#,
            link, i
        );
    }
    html.push_str("</ul></body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_fetcher_serves_and_records() {
        let fetcher = MockFetcher::new()
            .with_page("https://example.org/a", "<html></html>")
            .with_failure("https://example.org/b");

        assert!(fetcher.fetch("https://example.org/a").await.is_ok());
        assert!(fetcher.fetch("https://example.org/b").await.is_err());
        assert!(fetcher.fetch("https://example.org/missing").await.is_err());

        assert_eq!(fetcher.calls().len(), 3);
        assert_eq!(fetcher.fetch_count("https://example.org/a"), 1);
    }
}
