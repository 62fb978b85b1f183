//! Dimension hints scraped from element attributes and URLs.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

static PIXEL_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,5})(?:\.\d+)?\s*(?:px)?\s*$").expect("valid pixel value regex")
});
static SIZE_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{2,5})\s*[x×]\s*(\d{2,5})").expect("valid size text regex")
});
static URL_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/(\d{2,5})x(\d{2,5})(?:_rs)?/").expect("valid url size regex")
});

/// Width/height attribute pairs, probed in order.
const ATTRIBUTE_PAIRS: &[(&str, &str)] = &[
    ("width", "height"),
    ("data-width", "data-height"),
    ("naturalWidth", "naturalHeight"),
];

/// Free-text attributes that may carry a `WxH` token.
const TEXT_ATTRIBUTES: &[&str] = &["data-size", "sizes", "title", "data-dimensions"];

/// Read a positive `(width, height)` pair from element attributes.
///
/// Explicit numeric pairs win over `WxH` tokens in free-text attributes.
/// Attribute names are matched case-insensitively.
#[must_use]
pub fn dimensions_from_attributes(attrs: &BTreeMap<String, String>) -> Option<(u32, u32)> {
    ATTRIBUTE_PAIRS
        .iter()
        .find_map(|(w_key, h_key)| {
            let width = attr(attrs, w_key).and_then(parse_pixels)?;
            let height = attr(attrs, h_key).and_then(parse_pixels)?;
            Some((width, height))
        })
        .or_else(|| {
            TEXT_ATTRIBUTES
                .iter()
                .find_map(|key| attr(attrs, key).and_then(parse_size_text))
        })
}

/// Read a `WxH` size bucket such as `/1080x1920/` from a URL path.
#[must_use]
pub fn dimensions_from_url(url: &str) -> Option<(u32, u32)> {
    let caps = URL_SIZE_RE.captures(url)?;
    positive_pair(&caps[1], &caps[2])
}

fn attr<'a>(attrs: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    attrs.get(key).map(String::as_str).or_else(|| {
        attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    })
}

fn parse_pixels(value: &str) -> Option<u32> {
    let caps = PIXEL_VALUE_RE.captures(value)?;
    caps[1].parse::<u32>().ok().filter(|&v| v > 0)
}

fn parse_size_text(value: &str) -> Option<(u32, u32)> {
    let caps = SIZE_TEXT_RE.captures(value)?;
    positive_pair(&caps[1], &caps[2])
}

fn positive_pair(w: &str, h: &str) -> Option<(u32, u32)> {
    let width = w.parse::<u32>().ok().filter(|&v| v > 0)?;
    let height = h.parse::<u32>().ok().filter(|&v| v > 0)?;
    Some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn reads_plain_width_and_height() {
        let a = attrs(&[("width", "1080"), ("height", "1920")]);
        assert_eq!(dimensions_from_attributes(&a), Some((1080, 1920)));
    }

    #[test]
    fn accepts_px_suffix_and_fractional_values() {
        let a = attrs(&[("data-width", "736px"), ("data-height", "1104.5")]);
        assert_eq!(dimensions_from_attributes(&a), Some((736, 1104)));
    }

    #[test]
    fn attribute_names_are_case_insensitive() {
        let a = attrs(&[("naturalwidth", "1200"), ("NATURALHEIGHT", "1500")]);
        assert_eq!(dimensions_from_attributes(&a), Some((1200, 1500)));
    }

    #[test]
    fn falls_back_to_size_text() {
        let a = attrs(&[("width", "auto"), ("data-size", "Original 1080 × 1350")]);
        assert_eq!(dimensions_from_attributes(&a), Some((1080, 1350)));
    }

    #[test]
    fn zero_or_missing_values_yield_none() {
        assert_eq!(dimensions_from_attributes(&attrs(&[])), None);
        let a = attrs(&[("width", "0"), ("height", "1920")]);
        assert_eq!(dimensions_from_attributes(&a), None);
        let a = attrs(&[("width", "1080")]);
        assert_eq!(dimensions_from_attributes(&a), None);
    }

    #[test]
    fn url_size_bucket_is_read() {
        assert_eq!(
            dimensions_from_url("https://cdn.example.com/1080x1920/aa/bb/cc/x.jpg"),
            Some((1080, 1920))
        );
        assert_eq!(
            dimensions_from_url("https://i.pinimg.com/75x75_RS/aa/bb/cc/x.jpg"),
            Some((75, 75))
        );
    }

    #[test]
    fn width_only_bucket_has_no_dimensions() {
        assert_eq!(
            dimensions_from_url("https://i.pinimg.com/236x/aa/bb/cc/x.jpg"),
            None
        );
    }
}
