//! Tolerant mapping from untrusted JSON into view models.
//!
//! Every function here is total: malformed input degrades to defaults or is dropped,
//! it never produces an error.

pub mod case;
pub mod checkup;
pub mod decision;
pub mod home_feed;
pub mod news;
pub mod portfolio;

use serde_json::{Map, Value};

/// Top-level keys that may wrap a record list, in priority order.
const COLLECTION_KEYS: [&str; 4] = ["items", "data", "etfs", "results"];

pub(crate) type Row = Map<String, Value>;

/// Rows of a collection response: a bare array, or the first wrapper key holding an array.
pub(crate) fn collection_rows(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(rows) => rows,
        Value::Object(obj) => COLLECTION_KEYS
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

/// The first field among `keys` that is present and not null.
pub(crate) fn first_present<'a>(row: &'a Row, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| row.get(*key).filter(|value| !value.is_null()))
}

/// Like [`first_present`] but only yields arrays.
pub(crate) fn first_array<'a>(row: &'a Row, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .find_map(|key| row.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Scalars render as text; null, arrays and objects have no string form.
pub(crate) fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn string_or(row: &Row, keys: &[&str], default: &str) -> String {
    first_present(row, keys)
        .and_then(coerce_string)
        .unwrap_or_else(|| default.to_string())
}

/// Trimmed text, empty when missing.
pub(crate) fn trimmed(row: &Row, keys: &[&str]) -> String {
    first_present(row, keys)
        .and_then(coerce_string)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Text that is only kept when non-empty.
pub(crate) fn optional_string(row: &Row, keys: &[&str]) -> Option<String> {
    first_present(row, keys)
        .and_then(coerce_string)
        .filter(|s| !s.trim().is_empty())
}

pub(crate) fn ticker(row: &Row, keys: &[&str]) -> Option<String> {
    let ticker = trimmed(row, keys).to_uppercase();
    (!ticker.is_empty()).then_some(ticker)
}

/// Finite numbers, or strings that parse as one.
pub(crate) fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Non-empty strings of a string list, capped at `cap`.
pub(crate) fn string_list(values: &[Value], cap: usize) -> Vec<String> {
    values
        .iter()
        .filter_map(coerce_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(cap)
        .collect()
}

/// Maps each row, drops the ones that fail, and keeps at most `cap` survivors.
pub(crate) fn collect_valid<T>(
    rows: &[Value],
    cap: usize,
    what: &'static str,
    map: impl Fn(&Row) -> Option<T>,
) -> Vec<T> {
    let mut out = Vec::new();
    let mut dropped = 0usize;
    for row in rows {
        match row.as_object().and_then(&map) {
            Some(item) => out.push(item),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        tracing::debug!(what, dropped, kept = out.len(), "dropped malformed records");
    }
    out.truncate(cap);
    out
}
