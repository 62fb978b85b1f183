//! Locating the embedded state blob in a profile page and the post list
//! inside it.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static REHYDRATION_SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<script[^>]*\bid\s*=\s*["']__UNIVERSAL_DATA_FOR_REHYDRATION__["'][^>]*>(.*?)</script>"#,
    )
    .expect("valid rehydration script regex")
});
static UNIVERSAL_SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<script[^>]*\bid\s*=\s*["']__UNIVERSAL[^"']*DATA[^"']*["'][^>]*>(.*?)</script>"#,
    )
    .expect("valid universal script regex")
});
static SIGI_STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"window\.SIGI_STATE\s*=\s*").expect("valid SIGI_STATE regex")
});

/// Pull the JSON state blob out of a profile page.
///
/// Tries the `__UNIVERSAL_DATA_FOR_REHYDRATION__` script first, then any
/// script whose id looks like `__UNIVERSAL…DATA…`, then a
/// `window.SIGI_STATE = {...};` assignment. Returns `None` when none of them
/// holds valid JSON.
#[must_use]
pub fn extract_rehydration_data(html: &str) -> Option<Value> {
    [&*REHYDRATION_SCRIPT_RE, &*UNIVERSAL_SCRIPT_RE]
        .into_iter()
        .flat_map(|re| re.captures_iter(html))
        .find_map(|caps| serde_json::from_str::<Value>(caps[1].trim()).ok())
        .or_else(|| sigi_state(html))
}

fn sigi_state(html: &str) -> Option<Value> {
    SIGI_STATE_RE.find_iter(html).find_map(|m| {
        // The assignment is followed by more script; read exactly one value.
        let rest = &html[m.end()..];
        serde_json::Deserializer::from_str(rest)
            .into_iter::<Value>()
            .next()?
            .ok()
            .filter(Value::is_object)
    })
}

type FeedProbe = fn(&Value) -> Vec<&Value>;

/// Known places a post list lives, probed in order.
pub const FEED_PROBES: &[(&str, FeedProbe)] = &[
    ("user_detail", user_detail_items),
    ("webapp_item_list", webapp_item_lists),
    ("item_module", item_module),
    ("items", top_level_items),
    ("bare_array", bare_array),
];

/// Raw post records from the first probe in [`FEED_PROBES`] that finds any.
///
/// A payload carrying the same posts in several shapes yields them once.
#[must_use]
pub fn extract_feed_items(data: &Value) -> Vec<Value> {
    FEED_PROBES
        .iter()
        .find_map(|(name, probe)| {
            let found = probe(data);
            if found.is_empty() {
                return None;
            }
            tracing::debug!(probe = name, count = found.len(), "feed items found");
            Some(found.into_iter().cloned().collect())
        })
        .unwrap_or_default()
}

fn array_items(value: Option<&Value>) -> Vec<&Value> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().collect())
        .unwrap_or_default()
}

fn user_detail_items(data: &Value) -> Vec<&Value> {
    array_items(
        data.get("__DEFAULT_SCOPE__")
            .and_then(|scope| scope.get("webapp.user-detail"))
            .and_then(|detail| detail.get("userInfo"))
            .and_then(|info| info.get("itemList")),
    )
}

fn webapp_item_lists(data: &Value) -> Vec<&Value> {
    let Some(scope) = data.get("__DEFAULT_SCOPE__").and_then(Value::as_object) else {
        return Vec::new();
    };
    scope
        .iter()
        .filter(|(key, _)| key.starts_with("webapp."))
        .flat_map(|(_, section)| array_items(section.get("itemList")))
        .collect()
}

fn item_module(data: &Value) -> Vec<&Value> {
    data.get("ItemModule")
        .and_then(Value::as_object)
        .map(|module| module.values().collect())
        .unwrap_or_default()
}

fn top_level_items(data: &Value) -> Vec<&Value> {
    array_items(data.get("items"))
}

fn bare_array(data: &Value) -> Vec<&Value> {
    array_items(Some(data))
}
