//! Field normalization: raw extracted strings into typed values.
//!
//! Every function is pure, passes `None` through, and falls back to `None`
//! on unparsable input instead of raising. [`normalize_record`] composes
//! them and applies the housing-before-attrs precedence for beds and
//! square footage.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::{RawRecord, TypedRecord};

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    // "post id: 7001234567" label prefix
    static ref POST_ID_LABEL: Regex = Regex::new(r"^post id:\s*").unwrap();

    // Thousands separator between digits ("1,950")
    static ref THOUSANDS_SEPARATOR: Regex = Regex::new(r"(\d),(\d)").unwrap();
    static ref DIGIT_RUN: Regex = Regex::new(r"\d+").unwrap();

    // Lead-in line injected into every posting body
    static ref BOILERPLATE: Regex = Regex::new(r"QR Code Link to This Post").unwrap();
    static ref EXTRA_PUNCTUATION: Regex = Regex::new(r"[!?]").unwrap();
    static ref NON_PLAIN: Regex = Regex::new(r"[^a-zA-Z0-9\s.]").unwrap();

    static ref PARENS: Regex = Regex::new(r"[()]").unwrap();
    static ref MAP_LINK: Regex = Regex::new(r"\(google map\)").unwrap();
    static ref SLASH_DASH: Regex = Regex::new(r"[/-]").unwrap();

    static ref BEDS: Regex = Regex::new(r"(\d+)\s?br").unwrap();
    static ref SQFT: Regex = Regex::new(r"(\d+)\s?ft").unwrap();
}

/// Amenity phrases the attrs block uses for pet policy.
const DOGS_PHRASE: &str = "dogs are ok - wooof";
const CATS_PHRASE: &str = "cats are ok - purrr";

/// Normalized attrs text plus the amenity flags scanned out of it.
///
/// Flags are `Some` whenever the attrs text was present; absence of a
/// phrase means `Some(false)`, never a guess.
#[derive(Debug, Clone, Default)]
pub struct NormalizedAttrs {
    pub text: Option<String>,
    pub dogs_ok: Option<bool>,
    pub cats_ok: Option<bool>,
}

fn collapse(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").to_string()
}

/// Strip the "post id:" label prefix.
pub fn normalize_post_id(raw: Option<&str>) -> Option<String> {
    raw.map(|s| POST_ID_LABEL.replace(s.trim(), "").to_string())
        .filter(|s| !s.is_empty())
}

/// Parse a price out of noisy text.
///
/// Thousands separators between digits are removed first, then the first
/// digit run is parsed, so `"$1,950/month"` yields `1950.0`. Anything
/// without a digit run yields `None`.
pub fn normalize_price(raw: Option<&str>) -> Option<f64> {
    let raw = raw?;
    let squashed = THOUSANDS_SEPARATOR.replace_all(raw, "${1}${2}");
    DIGIT_RUN
        .find(&squashed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Clean free text (title, description) into a lowercase plain form.
///
/// Order matters: boilerplate removal and `!`/`?` conversion happen before
/// the character-class strip, which happens before whitespace collapse.
/// The result is a fixed point of this function.
pub fn clean_text(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let text = BOILERPLATE.replace_all(raw, " ");
    let text = EXTRA_PUNCTUATION.replace_all(&text, ". ");
    let text = NON_PLAIN.replace_all(&text, " ");
    let text = collapse(&text).to_lowercase();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Collapse whitespace and case-fold a placename.
pub fn normalize_placename(raw: Option<&str>) -> Option<String> {
    raw.map(|s| collapse(s).to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Split "lat;lon" into a numeric pair.
///
/// Any failure (wrong part count, either side unparsable) yields
/// `(None, None)`; the pair is never partial.
pub fn normalize_latlon(raw: Option<&str>) -> (Option<f64>, Option<f64>) {
    let Some(raw) = raw else {
        return (None, None);
    };

    let parts: Vec<&str> = raw.split(';').collect();
    if parts.len() != 2 {
        return (None, None);
    }

    match (
        parts[0].trim().parse::<f64>(),
        parts[1].trim().parse::<f64>(),
    ) {
        (Ok(lat), Ok(lon)) => (Some(lat), Some(lon)),
        _ => (None, None),
    }
}

/// Strip parenthesis characters; no other transform.
pub fn normalize_location(raw: Option<&str>) -> Option<String> {
    raw.map(|s| PARENS.replace_all(s, "").to_string())
}

/// Case-fold attrs text, drop the map-link marker, and scan out the
/// amenity flags (stripping each phrase once found).
pub fn normalize_attrs(raw: Option<&str>) -> NormalizedAttrs {
    let Some(raw) = raw else {
        return NormalizedAttrs::default();
    };

    let text = raw.to_lowercase();
    let text = MAP_LINK.replace_all(&text, " ");
    let mut text = collapse(&text);

    let dogs_ok = text.contains(DOGS_PHRASE);
    if dogs_ok {
        text = collapse(&text.replace(DOGS_PHRASE, " "));
    }

    let cats_ok = text.contains(CATS_PHRASE);
    if cats_ok {
        text = collapse(&text.replace(CATS_PHRASE, " "));
    }

    NormalizedAttrs {
        text: Some(text),
        dogs_ok: Some(dogs_ok),
        cats_ok: Some(cats_ok),
    }
}

/// Replace slash/dash separators with spaces, collapse, case-fold.
pub fn normalize_housing(raw: Option<&str>) -> Option<String> {
    raw.map(|s| collapse(&SLASH_DASH.replace_all(s, " ")).to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Bedroom count: integer preceding a "br" marker.
pub fn beds_in(text: &str) -> Option<i64> {
    BEDS.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Square footage: integer preceding an "ft" marker.
pub fn sqft_in(text: &str) -> Option<i64> {
    SQFT.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse the stringified image count.
pub fn normalize_image_count(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse().ok())
}

/// Derive a [`TypedRecord`] from a [`RawRecord`].
///
/// beds/sqft precedence: the housing text is tried first; the normalized
/// attrs text is only consulted when housing is absent or its own pattern
/// found nothing.
pub fn normalize_record(raw: &RawRecord) -> TypedRecord {
    let housing = normalize_housing(raw.housing.as_deref());
    let attrs = normalize_attrs(raw.attrs.as_deref());
    let (lat, lon) = normalize_latlon(raw.latlon.as_deref());

    let beds = housing
        .as_deref()
        .and_then(beds_in)
        .or_else(|| attrs.text.as_deref().and_then(beds_in));
    let sqft = housing
        .as_deref()
        .and_then(sqft_in)
        .or_else(|| attrs.text.as_deref().and_then(sqft_in));

    TypedRecord {
        url: raw.url.clone(),
        post_id: normalize_post_id(raw.post_id.as_deref()),
        price: normalize_price(raw.price.as_deref()),
        description: clean_text(raw.description.as_deref()),
        image_count: normalize_image_count(raw.image_count.as_deref()),
        post_time: raw.post_time.clone(),
        title: clean_text(raw.title.as_deref()),
        placename: normalize_placename(raw.placename.as_deref()),
        lat,
        lon,
        location: normalize_location(raw.location.as_deref()),
        housing,
        attrs: attrs.text,
        beds,
        sqft,
        dogs_ok: attrs.dogs_ok,
        cats_ok: attrs.cats_ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_id_label_stripped() {
        assert_eq!(
            normalize_post_id(Some("post id: 7001234567")).as_deref(),
            Some("7001234567")
        );
        assert_eq!(normalize_post_id(Some("7001234567")).as_deref(), Some("7001234567"));
        assert_eq!(normalize_post_id(None), None);
    }

    #[test]
    fn test_price_thousands_separator_policy() {
        // Separators between digits are squashed before the digit run is taken
        assert_eq!(normalize_price(Some("$1,950/month")), Some(1950.0));
        assert_eq!(normalize_price(Some("$950")), Some(950.0));
        assert_eq!(normalize_price(Some("1500")), Some(1500.0));
    }

    #[test]
    fn test_price_unparsable_is_none() {
        assert_eq!(normalize_price(Some("call for price")), None);
        assert_eq!(normalize_price(Some("")), None);
        assert_eq!(normalize_price(None), None);
    }

    #[test]
    fn test_clean_text_steps_in_order() {
        let cleaned = clean_text(Some(
            "QR Code Link to This Post\n  Sunny 2BR!! Near the park? W/D in-unit ❤",
        ));
        assert_eq!(
            cleaned.as_deref(),
            Some("sunny 2br. . near the park. w d in unit")
        );
    }

    #[test]
    fn test_clean_text_is_idempotent() {
        let samples = [
            "QR Code Link to This Post Charming studio!!! $1,950 (no fee?)",
            "ALL CAPS & symbols #1 ...",
            "already clean text.",
        ];
        for sample in samples {
            let once = clean_text(Some(sample));
            let twice = clean_text(once.as_deref());
            assert_eq!(once, twice, "not a fixed point for {:?}", sample);
        }
    }

    #[test]
    fn test_placename_collapsed_and_folded() {
        assert_eq!(
            normalize_placename(Some("  New\n  York ")).as_deref(),
            Some("new york")
        );
    }

    #[test]
    fn test_latlon_pair() {
        assert_eq!(normalize_latlon(Some("40.7;-74.0")), (Some(40.7), Some(-74.0)));
    }

    #[test]
    fn test_latlon_never_partial() {
        // Either side failing nulls the whole pair
        assert_eq!(normalize_latlon(Some("40.7;")), (None, None));
        assert_eq!(normalize_latlon(Some(";-74.0")), (None, None));
        assert_eq!(normalize_latlon(Some("40.7")), (None, None));
        assert_eq!(normalize_latlon(Some("40.7;-74.0;12")), (None, None));
        assert_eq!(normalize_latlon(Some("north;west")), (None, None));
        assert_eq!(normalize_latlon(None), (None, None));
    }

    #[test]
    fn test_location_parens_only() {
        assert_eq!(
            normalize_location(Some("(Park Slope)")).as_deref(),
            Some("Park Slope")
        );
        // No case folding, no whitespace changes
        assert_eq!(
            normalize_location(Some(" Upper West ")).as_deref(),
            Some(" Upper West ")
        );
    }

    #[test]
    fn test_attrs_flags_independent() {
        let attrs = normalize_attrs(Some("dogs are ok - wooof, near park"));
        assert_eq!(attrs.dogs_ok, Some(true));
        assert_eq!(attrs.cats_ok, Some(false));
        assert_eq!(attrs.text.as_deref(), Some(", near park"));

        let attrs = normalize_attrs(Some("cats are ok - purrr laundry (google map)"));
        assert_eq!(attrs.dogs_ok, Some(false));
        assert_eq!(attrs.cats_ok, Some(true));
        assert_eq!(attrs.text.as_deref(), Some("laundry"));
    }

    #[test]
    fn test_attrs_absent_means_unknown_flags() {
        let attrs = normalize_attrs(None);
        assert_eq!(attrs.text, None);
        assert_eq!(attrs.dogs_ok, None);
        assert_eq!(attrs.cats_ok, None);
    }

    #[test]
    fn test_housing_separators_and_markers() {
        let housing = normalize_housing(Some("/ 2BR - 900ft2 -"));
        assert_eq!(housing.as_deref(), Some("2br 900ft2"));
        assert_eq!(housing.as_deref().and_then(beds_in), Some(2));
        assert_eq!(housing.as_deref().and_then(sqft_in), Some(900));
    }

    #[test]
    fn test_beds_sqft_housing_wins() {
        let raw = record_with(Some("2br 900ft"), Some("3br 1200ft"));
        let typed = normalize_record(&raw);
        assert_eq!(typed.beds, Some(2));
        assert_eq!(typed.sqft, Some(900));
    }

    #[test]
    fn test_beds_sqft_fall_back_to_attrs() {
        let raw = record_with(None, Some("3br 1200ft"));
        let typed = normalize_record(&raw);
        assert_eq!(typed.beds, Some(3));
        assert_eq!(typed.sqft, Some(1200));
    }

    #[test]
    fn test_beds_sqft_fall_back_per_field() {
        // Housing matches beds but not sqft; sqft alone falls back
        let raw = record_with(Some("2br apartment"), Some("3br 1200ft"));
        let typed = normalize_record(&raw);
        assert_eq!(typed.beds, Some(2));
        assert_eq!(typed.sqft, Some(1200));
    }

    #[test]
    fn test_beds_sqft_none_when_both_fail() {
        let raw = record_with(Some("studio"), Some("no pets"));
        let typed = normalize_record(&raw);
        assert_eq!(typed.beds, None);
        assert_eq!(typed.sqft, None);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut raw = RawRecord::new("https://example.org/apa/1.html");
        raw.housing = None;
        raw.attrs = Some("2br - dogs are ok - wooof".to_string());
        raw.latlon = Some("40.7;-74.0".to_string());

        let typed = normalize_record(&raw);
        assert_eq!(typed.beds, Some(2));
        assert_eq!(typed.sqft, None);
        assert_eq!(typed.dogs_ok, Some(true));
        assert_eq!(typed.cats_ok, Some(false));
        assert_eq!(typed.lat, Some(40.7));
        assert_eq!(typed.lon, Some(-74.0));
    }

    #[test]
    fn test_lat_lon_pairing_invariant_on_record() {
        for latlon in [None, Some("40.7;-74.0"), Some("40.7;x"), Some("junk")] {
            let mut raw = RawRecord::new("https://example.org/apa/1.html");
            raw.latlon = latlon.map(String::from);
            let typed = normalize_record(&raw);
            assert_eq!(typed.lat.is_some(), typed.lon.is_some());
        }
    }

    fn record_with(housing: Option<&str>, attrs: Option<&str>) -> RawRecord {
        let mut raw = RawRecord::new("https://example.org/apa/1.html");
        raw.housing = housing.map(String::from);
        raw.attrs = attrs.map(String::from);
        raw
    }
}
