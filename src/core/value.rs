//! Value helpers shared by the interpolation engine, the catalog and crafts.
//!
//! Every value flowing through craftline is a [`serde_json::Value`]. The
//! absence marker is [`Value::Null`]: a key mapped to `Null` is *present*
//! with no value, which is distinct from a missing key.

use serde_json::{Map, Value};

/// A name → value mapping (call arguments, configuration layers, volatiles).
pub type Params = Map<String, Value>;

/// Recursively merge `right` into `left`.
///
/// Keys present on both sides whose values are both mappings are merged
/// key by key, everything else in `right` replaces what is in `left`.
pub fn recursive_merge(left: &mut Params, right: &Params) {
    for (key, value) in right {
        match (left.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                recursive_merge(existing, incoming);
            }
            _ => {
                left.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Replace top-level keys of `left` with those of `right`.
pub fn override_merge(left: &mut Params, right: &Params) {
    for (key, value) in right {
        left.insert(key.clone(), value.clone());
    }
}

/// Look up a dotted path (`a.b.c`) in a nested mapping.
///
/// Returns `None` when a segment is missing or a non-mapping is traversed.
/// A path ending on `Null` returns `Some(&Value::Null)`.
pub fn lookup_path<'a>(root: &'a Params, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = root.get(first)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Render a value for concatenation with surrounding text.
///
/// Strings are inserted without quotes, `Null` renders as `None`, and
/// compound values render as compact JSON.
#[must_use]
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Parse a command-line style `value` as JSON, falling back to a plain string.
#[must_use]
pub fn parse_loose(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
