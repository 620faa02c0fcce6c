//! Per-field listing page extraction.
//!
//! Each field is looked up independently through a declarative rule table:
//! a primary lookup strategy and an optional fallback. A field whose whole
//! chain finds nothing stays `None`; one field's failure never affects the
//! others.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractError;
use crate::types::RawRecord;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    static ref URL_POST_ID: Regex = Regex::new(r"/(\d+)\.html$").unwrap();
}

/// Field slots of a [`RawRecord`] the rule table can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    PostId,
    Price,
    Description,
    ImageCount,
    PostTime,
    Title,
    Placename,
    LatLon,
    Location,
    Housing,
    Attrs,
}

/// A single lookup strategy against the parsed page.
#[derive(Debug, Clone, Copy)]
pub enum Lookup {
    /// Collapsed text of the first element matching the selector.
    /// Empty text counts as not found, so a fallback can take over.
    Text(&'static str),
    /// Attribute value of the first element matching the selector.
    Attr(&'static str, &'static str),
    /// Number of elements matching the selector, as a string.
    /// Always succeeds; zero matches yields "0".
    Count(&'static str),
    /// First text node anywhere in the page containing the marker.
    TextMarker(&'static str),
    /// Trailing digits of the listing URL path ("/<digits>.html").
    UrlDigits,
    /// Raw markup of the first element matching the selector.
    RawMarkup(&'static str),
    /// Text of every match, joined and whitespace-collapsed.
    JoinedText(&'static str),
}

/// One row of the extraction table.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub lookup: Lookup,
    pub fallback: Option<Lookup>,
}

/// The extraction table: lookup precedence per field.
pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::PostId,
        lookup: Lookup::TextMarker("post id:"),
        fallback: Some(Lookup::UrlDigits),
    },
    FieldRule {
        field: Field::Price,
        lookup: Lookup::Text("span.price"),
        fallback: None,
    },
    FieldRule {
        field: Field::Description,
        lookup: Lookup::Text("#postingbody"),
        fallback: Some(Lookup::RawMarkup("#postingbody")),
    },
    FieldRule {
        field: Field::ImageCount,
        lookup: Lookup::Count(".slide"),
        fallback: None,
    },
    FieldRule {
        field: Field::PostTime,
        lookup: Lookup::Text("time.timeago"),
        fallback: None,
    },
    FieldRule {
        field: Field::Title,
        lookup: Lookup::Attr(r#"meta[property="og:title"]"#, "content"),
        fallback: None,
    },
    FieldRule {
        field: Field::Placename,
        lookup: Lookup::Attr(r#"meta[name="geo.placename"]"#, "content"),
        fallback: None,
    },
    FieldRule {
        field: Field::LatLon,
        lookup: Lookup::Attr(r#"meta[name="geo.position"]"#, "content"),
        fallback: None,
    },
    FieldRule {
        field: Field::Location,
        lookup: Lookup::Text(".postingtitle small"),
        fallback: None,
    },
    FieldRule {
        field: Field::Housing,
        lookup: Lookup::Text(".housing"),
        fallback: None,
    },
    FieldRule {
        field: Field::Attrs,
        lookup: Lookup::JoinedText(".mapAndAttrs p"),
        fallback: None,
    },
];

/// Extract a [`RawRecord`] from one listing page.
///
/// Fields are filled independently through [`FIELD_RULES`]. Returns an
/// error only when the body is empty; the caller should then leave the
/// URL unvisited so a later pass retries it.
pub fn extract_listing(url: &str, html: &str) -> Result<RawRecord, ExtractError> {
    if html.trim().is_empty() {
        return Err(ExtractError::UnparseablePage {
            url: url.to_string(),
        });
    }

    let document = Html::parse_document(html);
    let mut record = RawRecord::new(url);

    for rule in FIELD_RULES {
        let value = apply(&document, url, rule.lookup).or_else(|| {
            rule.fallback
                .and_then(|fallback| apply(&document, url, fallback))
        });
        set_field(&mut record, rule.field, value);
    }

    Ok(record)
}

fn apply(document: &Html, url: &str, lookup: Lookup) -> Option<String> {
    match lookup {
        Lookup::Text(selector) => first_match(document, selector)
            .map(collapsed_text)
            .filter(|text| !text.is_empty()),
        Lookup::Attr(selector, attr) => first_match(document, selector)
            .and_then(|el| el.value().attr(attr))
            .map(str::to_string),
        Lookup::Count(selector) => {
            let count = Selector::parse(selector)
                .map(|s| document.select(&s).count())
                .unwrap_or(0);
            Some(count.to_string())
        }
        Lookup::TextMarker(marker) => document
            .root_element()
            .text()
            .map(str::trim)
            .find(|text| text.contains(marker))
            .map(str::to_string),
        Lookup::UrlDigits => URL_POST_ID
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string()),
        Lookup::RawMarkup(selector) => first_match(document, selector).map(|el| el.html()),
        Lookup::JoinedText(selector) => {
            let selector = Selector::parse(selector).ok()?;
            let joined = document
                .select(&selector)
                .map(collapsed_text)
                .collect::<Vec<_>>()
                .join(" ");
            let joined = WHITESPACE_RUN.replace_all(joined.trim(), " ").to_string();
            if joined.is_empty() {
                None
            } else {
                Some(joined)
            }
        }
    }
}

fn first_match<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}

fn collapsed_text(el: ElementRef<'_>) -> String {
    let text = el.text().collect::<Vec<_>>().join(" ");
    WHITESPACE_RUN.replace_all(text.trim(), " ").to_string()
}

fn set_field(record: &mut RawRecord, field: Field, value: Option<String>) {
    match field {
        Field::PostId => record.post_id = value,
        Field::Price => record.price = value,
        Field::Description => record.description = value,
        Field::ImageCount => record.image_count = value,
        Field::PostTime => record.post_time = value,
        Field::Title => record.title = value,
        Field::Placename => record.placename = value,
        Field::LatLon => record.latlon = value,
        Field::Location => record.location = value,
        Field::Housing => record.housing = value,
        Field::Attrs => record.attrs = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{listing_page, ListingFixture};

    #[test]
    fn test_full_page_extraction() {
        let html = listing_page(&ListingFixture::default());
        let record = extract_listing("https://example.org/apa/7001234567.html", &html).unwrap();

        assert_eq!(record.post_id.as_deref(), Some("post id: 7001234567"));
        assert_eq!(record.price.as_deref(), Some("$1,950"));
        assert_eq!(
            record.description.as_deref(),
            Some("QR Code Link to This Post Sunny two bedroom near the park!")
        );
        assert_eq!(record.image_count.as_deref(), Some("3"));
        assert_eq!(record.post_time.as_deref(), Some("3 days ago"));
        assert_eq!(record.title.as_deref(), Some("Sunny 2BR near park"));
        assert_eq!(record.placename.as_deref(), Some("Brooklyn"));
        assert_eq!(record.latlon.as_deref(), Some("40.7;-74.0"));
        assert_eq!(record.location.as_deref(), Some("(Park Slope)"));
        assert_eq!(record.housing.as_deref(), Some("2br - 900ft2"));
        assert_eq!(
            record.attrs.as_deref(),
            Some("apartment laundry in bldg dogs are ok - wooof (google map)")
        );
    }

    #[test]
    fn test_missing_fields_stay_none() {
        let fixture = ListingFixture {
            price: None,
            housing: None,
            latlon: None,
            ..ListingFixture::default()
        };
        let record =
            extract_listing("https://example.org/apa/7001234567.html", &listing_page(&fixture))
                .unwrap();

        assert!(record.price.is_none());
        assert!(record.housing.is_none());
        assert!(record.latlon.is_none());
        // Unrelated fields still extract
        assert_eq!(record.title.as_deref(), Some("Sunny 2BR near park"));
    }

    #[test]
    fn test_image_count_zero_when_no_slides() {
        let fixture = ListingFixture {
            image_count: 0,
            ..ListingFixture::default()
        };
        let record =
            extract_listing("https://example.org/apa/7001234567.html", &listing_page(&fixture))
                .unwrap();

        assert_eq!(record.image_count.as_deref(), Some("0"));
    }

    #[test]
    fn test_post_id_falls_back_to_url_digits() {
        let fixture = ListingFixture {
            post_id: None,
            ..ListingFixture::default()
        };
        let record =
            extract_listing("https://example.org/apa/7009998888.html", &listing_page(&fixture))
                .unwrap();

        assert_eq!(record.post_id.as_deref(), Some("7009998888"));
    }

    #[test]
    fn test_post_id_none_when_url_has_no_digits() {
        let fixture = ListingFixture {
            post_id: None,
            ..ListingFixture::default()
        };
        let record =
            extract_listing("https://example.org/apa/current", &listing_page(&fixture)).unwrap();

        assert!(record.post_id.is_none());
    }

    #[test]
    fn test_description_falls_back_to_raw_markup() {
        // Body container present but holding only child markup, no text
        let html = r#"
            <html><body>
                <section id="postingbody"><img src="floorplan.png"></section>
            </body></html>
        "#;
        let record = extract_listing("https://example.org/apa/1.html", html).unwrap();

        let description = record.description.unwrap();
        assert!(description.contains("floorplan.png"));
    }

    #[test]
    fn test_empty_body_is_unparseable() {
        let result = extract_listing("https://example.org/apa/1.html", "   \n  ");
        assert!(matches!(
            result,
            Err(ExtractError::UnparseablePage { .. })
        ));
    }

    #[test]
    fn test_every_field_has_exactly_one_rule() {
        let mut seen = Vec::new();
        for rule in FIELD_RULES {
            assert!(!seen.contains(&rule.field), "duplicate rule: {:?}", rule.field);
            seen.push(rule.field);
        }
        assert_eq!(seen.len(), 11);
    }
}
