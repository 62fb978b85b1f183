//! Multi-image ("slideshow") detection over raw post records.
//!
//! Detection is an OR over the named probes in [`SIGNALS`]. Each probe is
//! tolerant of missing or oddly-typed keys.

use serde_json::{Map, Value};

/// Everything a probe may look at.
pub struct SignalInput<'a> {
    pub record: &'a Map<String, Value>,
    /// The record serialized to JSON and lowercased.
    pub serialized: &'a str,
    /// Indicator words, lowercased.
    pub indicators: &'a [String],
}

pub struct Signal {
    pub name: &'static str,
    pub probe: fn(&SignalInput<'_>) -> bool,
}

pub const SIGNALS: &[Signal] = &[
    Signal {
        name: "indicator_vocabulary",
        probe: indicator_vocabulary,
    },
    Signal {
        name: "image_url_list",
        probe: image_url_list,
    },
    Signal {
        name: "type_field",
        probe: type_field,
    },
    Signal {
        name: "images_list",
        probe: images_list,
    },
];

/// True when any signal fires. Non-object records are never multi-image.
#[must_use]
pub fn is_multi_image(record: &Value, indicators: &[String]) -> bool {
    !matched_signals(record, indicators).is_empty()
}

/// Names of the signals that fire for `record`, in table order.
#[must_use]
pub fn matched_signals(record: &Value, indicators: &[String]) -> Vec<&'static str> {
    let Some(map) = record.as_object() else {
        return Vec::new();
    };

    let serialized = serde_json::to_string(record)
        .unwrap_or_default()
        .to_lowercase();
    let indicators: Vec<String> = indicators
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();

    let input = SignalInput {
        record: map,
        serialized: &serialized,
        indicators: &indicators,
    };

    SIGNALS
        .iter()
        .filter(|signal| (signal.probe)(&input))
        .map(|signal| signal.name)
        .collect()
}

fn indicator_vocabulary(input: &SignalInput<'_>) -> bool {
    input
        .indicators
        .iter()
        .any(|word| input.serialized.contains(word.as_str()))
}

fn image_url_list(input: &SignalInput<'_>) -> bool {
    has_long_image_url_list(input.record) || input.serialized.matches("imageurl").count() > 1
}

fn has_long_image_url_list(map: &Map<String, Value>) -> bool {
    map.iter().any(|(key, value)| {
        let long_list = key.eq_ignore_ascii_case("imageurls")
            && value.as_array().is_some_and(|list| list.len() > 1);
        long_list || nested(value).any(has_long_image_url_list)
    })
}

fn nested(value: &Value) -> Box<dyn Iterator<Item = &Map<String, Value>> + '_> {
    match value {
        Value::Object(map) => Box::new(std::iter::once(map)),
        Value::Array(items) => Box::new(items.iter().filter_map(Value::as_object)),
        _ => Box::new(std::iter::empty()),
    }
}

fn type_field(input: &SignalInput<'_>) -> bool {
    let rendered = match input.record.get("type") {
        Some(Value::String(s)) => s.to_lowercase(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return false,
    };
    input
        .indicators
        .iter()
        .any(|word| rendered.contains(word.as_str()))
}

fn images_list(input: &SignalInput<'_>) -> bool {
    let long = |v: Option<&Value>| v.and_then(Value::as_array).is_some_and(|a| a.len() > 1);
    long(input.record.get("images"))
        || long(
            input
                .record
                .get("imagePost")
                .and_then(|post| post.get("images")),
        )
}
