//! Primitive coercion helpers shared by every HAR entity.
//!
//! These are pure functions over `serde_json` values. They never fail: bad
//! input degrades to `None` (or `null`) and it is up to the caller to decide
//! whether that is worth reporting.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Number, Value};

/// An ordered JSON object. Key order follows insertion order.
pub type JsonObject = Map<String, Value>;

/// Drop `null` entries from `map` unless `include_nulls` is set.
///
/// With `include_nulls` the map is handed back untouched. Otherwise the
/// surviving keys keep their original relative order.
pub fn prune_nulls(map: JsonObject, include_nulls: bool) -> JsonObject {
    if include_nulls {
        return map;
    }
    map.into_iter().filter(|(_, v)| !v.is_null()).collect()
}

/// Render a measurement as JSON, collapsing whole values to integers.
///
/// `42.0` becomes `42`, `42.5` stays `42.5`. `None` and non-finite values
/// become `null`.
pub fn normalize_number(value: Option<f64>) -> Value {
    match value {
        Some(n) if n.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&n) => {
            Value::from(n as i64)
        }
        Some(n) => Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
        None => Value::Null,
    }
}

/// Copy every key of `obj` that is not in `claimed`.
pub fn collect_custom(obj: &JsonObject, claimed: &[&str]) -> JsonObject {
    obj.iter()
        .filter(|(key, _)| !claimed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Parse a millisecond measurement from a number or a numeric string.
pub fn parse_millis(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Parse an integer from an integer, a whole float, or a numeric string.
pub fn parse_int(value: Option<&Value>) -> Option<i64> {
    let as_whole = |n: f64| {
        (n.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&n)).then_some(n as i64)
    };
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(as_whole)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(as_whole))
        }
        _ => None,
    }
}

/// Tolerant timestamp parsing.
///
/// Accepts ISO-8601 / RFC 3339 (offset optional, `T` or space separator),
/// RFC 2822 and IMF-fixdate, the legacy `Sun, 15-Jul-2012 10:00:00 GMT`
/// cookie form, bare dates, and numbers holding epoch milliseconds.
/// Timestamps without an offset are taken as UTC.
pub fn parse_date(value: Option<&Value>) -> Option<DateTime<FixedOffset>> {
    match value? {
        Value::String(s) => parse_date_str(s),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.fixed_offset())
        }
        _ => None,
    }
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%a, %d-%b-%Y %H:%M:%S GMT",
    "%A, %d-%b-%y %H:%M:%S GMT",
    "%a %b %e %H:%M:%S %Y",
];

fn parse_date_str(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt);
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(utc(naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(utc)
}

fn utc(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    Utc.from_utc_datetime(&naive).fixed_offset()
}

/// Short JSON type name used in anomaly messages.
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
