//! Discovery phase parsing: collect listing links from search-result pages.

use scraper::{Html, Selector};
use url::Url;

/// Extract listing URLs from a search-result page.
///
/// Selects the anchor of every result row and resolves relative hrefs
/// against the page URL. A page with no result list (empty band, layout
/// drift) yields an empty vector, not an error.
pub fn listing_links(page_url: &str, html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("ul.rows li a.result-title") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let base = Url::parse(page_url).ok();

    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| match &base {
            Some(base) => base.join(href).ok().map(|resolved| resolved.to_string()),
            None => Some(href.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::search_page;

    const PAGE: &str = "https://example.org/search/apa?s=0";

    #[test]
    fn test_collects_result_links() {
        let html = search_page(&[
            "https://example.org/apa/101.html",
            "https://example.org/apa/102.html",
        ]);

        let links = listing_links(PAGE, &html);
        assert_eq!(
            links,
            vec![
                "https://example.org/apa/101.html",
                "https://example.org/apa/102.html",
            ]
        );
    }

    #[test]
    fn test_relative_hrefs_resolve_against_page() {
        let html = search_page(&["/apa/103.html"]);

        let links = listing_links(PAGE, &html);
        assert_eq!(links, vec!["https://example.org/apa/103.html"]);
    }

    #[test]
    fn test_page_without_result_list() {
        let links = listing_links(PAGE, "<html><body><p>no matches</p></body></html>");
        assert!(links.is_empty());
    }

    #[test]
    fn test_rows_without_title_anchor_are_skipped() {
        let html = r#"
            <html><body><ul class="rows">
                <li><a class="result-title" href="https://example.org/apa/1.html">one</a></li>
                <li><a href="https://example.org/apa/2.html">untitled</a></li>
            </ul></body></html>
        "#;

        let links = listing_links(PAGE, html);
        assert_eq!(links, vec!["https://example.org/apa/1.html"]);
    }
}
