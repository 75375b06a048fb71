//! The contract every HAR entity implements.
//!
//! Parsing is tolerant: a required field that is missing or has the wrong
//! JSON type is recorded as an [`Anomaly`] on the [`ParseContext`] and
//! replaced with a safe default, so one bad field never aborts the document.
//! Whether anomalies are fatal is decided by the caller at the reader
//! boundary (see [`ValidationMode`]).

use super::date::HarDate;
use super::json::{self, JsonObject};
use super::options::ValidationMode;
use serde_json::Value;
use std::fmt;

/// A structural problem found while parsing, with the field path it was found at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Parse-time state threaded through every `from_json` call.
#[derive(Debug)]
pub struct ParseContext {
    mode: ValidationMode,
    path: Vec<String>,
    anomalies: Vec<Anomaly>,
}

impl ParseContext {
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            path: Vec::new(),
            anomalies: Vec::new(),
        }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn into_anomalies(self) -> Vec<Anomaly> {
        self.anomalies
    }

    /// Record an anomaly for `key` under the current path.
    pub fn report(&mut self, key: &str, message: impl Into<String>) {
        let anomaly = Anomaly {
            path: self.path_to(key),
            message: message.into(),
        };

        match self.mode {
            ValidationMode::Lenient => {
                tracing::debug!("HAR anomaly at {}: {}", anomaly.path, anomaly.message)
            }
            ValidationMode::Strict => {
                tracing::warn!("HAR anomaly at {}: {}", anomaly.path, anomaly.message)
            }
        }

        self.anomalies.push(anomaly);
    }

    /// Run `f` with `segment` pushed onto the current path.
    pub fn nested<R>(&mut self, segment: impl Into<String>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(segment.into());
        let result = f(self);
        self.path.pop();
        result
    }

    fn path_to(&self, key: &str) -> String {
        let mut path = String::new();
        for segment in self.path.iter().map(String::as_str).chain(Some(key)) {
            if segment.is_empty() {
                continue;
            }
            if !path.is_empty() && !segment.starts_with('[') {
                path.push('.');
            }
            path.push_str(segment);
        }
        if path.is_empty() {
            path.push_str("<root>");
        }
        path
    }
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::new(ValidationMode::default())
    }
}

/// A modeled HAR object.
///
/// Every entity carries an optional `comment` and a bag of `custom` fields
/// holding every key the entity does not declare. `custom` is written back
/// after the declared fields, so vendor data survives a round trip.
pub trait HarObject: Clone + PartialEq + Default + fmt::Debug {
    /// JSON keys this type reads itself, `comment` included.
    const FIELDS: &'static [&'static str];

    /// Build from a decoded object. `claimed` lists extra keys owned by a
    /// wrapping type that must not end up in `custom`.
    fn from_json_claiming(obj: &JsonObject, cx: &mut ParseContext, claimed: &[&str]) -> Self;

    /// Write declared fields other than `comment`.
    fn write_fields(&self, w: &mut JsonWriter);

    fn comment(&self) -> Option<&str>;

    fn custom(&self) -> &JsonObject;

    fn with_comment(self, comment: Option<String>) -> Self;

    fn with_custom(self, custom: JsonObject) -> Self;

    fn from_json(obj: &JsonObject, cx: &mut ParseContext) -> Self {
        Self::from_json_claiming(obj, cx, &[])
    }

    /// Like `from_json`, but also accepts a non-object value, which is an
    /// anomaly and yields the default.
    fn from_value(value: &Value, cx: &mut ParseContext) -> Self {
        match value {
            Value::Object(obj) => Self::from_json(obj, cx),
            other => {
                cx.report("", format!("expected object, found {}", json::kind(other)));
                Self::default()
            }
        }
    }

    fn to_json(&self, include_nulls: bool) -> JsonObject {
        let mut w = JsonWriter::new(include_nulls);
        self.write_fields(&mut w);
        w.finish(self.comment(), self.custom())
    }

    fn to_value(&self, include_nulls: bool) -> Value {
        Value::Object(self.to_json(include_nulls))
    }
}

/// A closed set of string values, matched case-insensitively.
pub trait HarEnum: Sized + Copy {
    fn parse(s: &str) -> Option<Self>;

    fn as_str(&self) -> &'static str;
}

/// Declare a [`HarEnum`] from `Variant => "wire"` pairs.
macro_rules! har_enum {
    ($(#[$meta:meta])* pub enum $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $crate::har::HarEnum for $name {
            fn parse(s: &str) -> Option<Self> {
                $(if s.eq_ignore_ascii_case($wire) {
                    return Some($name::$variant);
                })+
                None
            }

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::har::HarEnum::as_str(self))
            }
        }
    };
}

pub(crate) use har_enum;

/// The `comment` / `custom` half of [`HarObject`] for structs that hold both
/// fields directly.
macro_rules! comment_and_custom {
    () => {
        fn comment(&self) -> Option<&str> {
            self.comment.as_deref()
        }

        fn custom(&self) -> &$crate::har::JsonObject {
            &self.custom
        }

        fn with_comment(mut self, comment: Option<String>) -> Self {
            self.comment = comment;
            self
        }

        fn with_custom(mut self, custom: $crate::har::JsonObject) -> Self {
            self.custom = custom;
            self
        }
    };
}

pub(crate) use comment_and_custom;

/// Typed, tolerant access to the fields of one JSON object.
pub struct FieldReader<'a, 'c> {
    obj: &'a JsonObject,
    cx: &'c mut ParseContext,
    /// Declared keys whose value was not understood and stays a vendor field
    released: Vec<String>,
}

impl<'a, 'c> FieldReader<'a, 'c> {
    pub fn new(obj: &'a JsonObject, cx: &'c mut ParseContext) -> Self {
        Self {
            obj,
            cx,
            released: Vec::new(),
        }
    }

    fn is_released(&self, key: &str) -> bool {
        self.released.iter().any(|r| r == key)
    }

    /// The value at `key`, treating an explicit `null` as absent.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.obj.get(key).filter(|v| !v.is_null())
    }

    fn missing(&mut self, key: &str) {
        self.cx.report(key, "required field is missing");
    }

    fn mismatch(&mut self, key: &str, expected: &str, found: &Value) {
        self.cx.report(
            key,
            format!("expected {}, found {}", expected, json::kind(found)),
        );
    }

    pub fn string(&mut self, key: &str) -> String {
        self.string_or(key, "")
    }

    pub fn string_or(&mut self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(_) => self
                .opt_string(key)
                .unwrap_or_else(|| default.to_string()),
            None => {
                self.missing(key);
                default.to_string()
            }
        }
    }

    pub fn opt_string(&mut self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            other => {
                self.mismatch(key, "string", other);
                None
            }
        }
    }

    pub fn int(&mut self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(_) => self.opt_int(key).unwrap_or(default),
            None => {
                self.missing(key);
                default
            }
        }
    }

    pub fn opt_int(&mut self, key: &str) -> Option<i64> {
        let value = self.get(key)?;
        let parsed = json::parse_int(Some(value));
        if parsed.is_none() {
            self.mismatch(key, "integer", value);
        }
        parsed
    }

    pub fn millis(&mut self, key: &str, default: f64) -> f64 {
        match self.get(key) {
            Some(_) => self.opt_millis(key).unwrap_or(default),
            None => {
                self.missing(key);
                default
            }
        }
    }

    pub fn opt_millis(&mut self, key: &str) -> Option<f64> {
        let value = self.get(key)?;
        let parsed = json::parse_millis(Some(value));
        if parsed.is_none() {
            self.mismatch(key, "number", value);
        }
        parsed
    }

    pub fn opt_bool(&mut self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(b) => Some(*b),
            other => {
                self.mismatch(key, "boolean", other);
                None
            }
        }
    }

    pub fn date(&mut self, key: &str) -> HarDate {
        match self.get(key) {
            Some(_) => self.opt_date(key).unwrap_or_default(),
            None => {
                self.missing(key);
                HarDate::epoch()
            }
        }
    }

    /// Dates keep their source value, string or epoch-millis number. One
    /// that does not parse is still kept verbatim, on top of the epoch.
    pub fn opt_date(&mut self, key: &str) -> Option<HarDate> {
        let value = self.get(key)?;
        let parsed = json::parse_date(Some(value));
        if parsed.is_none() {
            self.cx.report(
                key,
                format!("unparseable date ({})", json::kind(value)),
            );
        }

        let date = HarDate::new(parsed.unwrap_or_else(|| HarDate::epoch().value()));
        Some(match value {
            Value::String(_) | Value::Number(_) => date.with_raw_value(value.clone()),
            _ => date,
        })
    }

    pub fn object<T: HarObject>(&mut self, key: &str) -> T {
        match self.get(key) {
            Some(_) => self.opt_object(key).unwrap_or_default(),
            None => {
                self.missing(key);
                T::default()
            }
        }
    }

    pub fn opt_object<T: HarObject>(&mut self, key: &str) -> Option<T> {
        match self.get(key)? {
            Value::Object(obj) => Some(self.cx.nested(key, |cx| T::from_json(obj, cx))),
            other => {
                self.mismatch(key, "object", other);
                None
            }
        }
    }

    pub fn list<T: HarObject>(&mut self, key: &str) -> Vec<T> {
        match self.get(key) {
            Some(_) => self.opt_list(key).unwrap_or_default(),
            None => {
                self.missing(key);
                Vec::new()
            }
        }
    }

    /// Elements that are not objects are dropped without an anomaly.
    pub fn opt_list<T: HarObject>(&mut self, key: &str) -> Option<Vec<T>> {
        match self.get(key)? {
            Value::Array(items) => Some(self.cx.nested(key, |cx| {
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(idx, item)| match item {
                        Value::Object(obj) => {
                            Some(cx.nested(format!("[{}]", idx), |cx| T::from_json(obj, cx)))
                        }
                        _ => None,
                    })
                    .collect()
            })),
            other => {
                self.mismatch(key, "array", other);
                None
            }
        }
    }

    /// Unknown strings resolve to `None` and are not anomalies. The key is
    /// released so the source value survives in `custom`.
    pub fn opt_enum<T: HarEnum>(&mut self, key: &str) -> Option<T> {
        match self.get(key)? {
            Value::String(s) => {
                let parsed = T::parse(s);
                if parsed.is_none() {
                    tracing::debug!("Unrecognized value for {}: {}, kept as vendor field", key, s);
                    self.released.push(key.to_string());
                }
                parsed
            }
            other => {
                self.mismatch(key, "string", other);
                None
            }
        }
    }

    /// The raw value at `key`, unvalidated.
    pub fn opt_value(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }

    pub fn comment(&mut self) -> Option<String> {
        self.opt_string("comment")
    }

    /// `fields` minus the keys released by [`Self::opt_enum`].
    ///
    /// Wrapping types pass this down as their claimed set, so a released key
    /// lands in the wrapped value's `custom`.
    pub fn claimable<'k>(&self, fields: &[&'k str]) -> Vec<&'k str> {
        fields
            .iter()
            .copied()
            .filter(|key| !self.is_released(key))
            .collect()
    }

    /// Vendor fields: every key outside `fields` and `claimed`, plus released
    /// keys.
    pub fn custom(&self, fields: &[&str], claimed: &[&str]) -> JsonObject {
        let excluded: Vec<&str> = fields
            .iter()
            .chain(claimed)
            .copied()
            .filter(|key| !self.is_released(key))
            .collect();
        json::collect_custom(self.obj, &excluded)
    }
}

/// Builds the JSON object for one entity.
///
/// Optional fields are written as `null` when unset and pruned in `finish`
/// unless nulls were requested.
pub struct JsonWriter {
    map: JsonObject,
    include_nulls: bool,
}

impl JsonWriter {
    pub fn new(include_nulls: bool) -> Self {
        Self {
            map: JsonObject::new(),
            include_nulls,
        }
    }

    pub fn put(&mut self, key: &str, value: impl Into<Value>) {
        self.map.insert(key.to_string(), value.into());
    }

    pub fn str(&mut self, key: &str, value: &str) {
        self.put(key, value);
    }

    pub fn opt_str(&mut self, key: &str, value: Option<&str>) {
        self.put(key, value.map_or(Value::Null, Value::from));
    }

    pub fn int(&mut self, key: &str, value: i64) {
        self.put(key, value);
    }

    pub fn opt_int(&mut self, key: &str, value: Option<i64>) {
        self.put(key, value.map_or(Value::Null, Value::from));
    }

    pub fn opt_bool(&mut self, key: &str, value: Option<bool>) {
        self.put(key, value.map_or(Value::Null, Value::from));
    }

    pub fn millis(&mut self, key: &str, value: f64) {
        self.put(key, json::normalize_number(Some(value)));
    }

    pub fn opt_millis(&mut self, key: &str, value: Option<f64>) {
        self.put(key, json::normalize_number(value));
    }

    pub fn date(&mut self, key: &str, value: &HarDate) {
        self.put(key, value);
    }

    pub fn opt_date(&mut self, key: &str, value: Option<&HarDate>) {
        self.put(key, value.map_or(Value::Null, Value::from));
    }

    pub fn object<T: HarObject>(&mut self, key: &str, value: &T) {
        let obj = value.to_value(self.include_nulls);
        self.put(key, obj);
    }

    pub fn opt_object<T: HarObject>(&mut self, key: &str, value: Option<&T>) {
        let obj = value.map_or(Value::Null, |v| v.to_value(self.include_nulls));
        self.put(key, obj);
    }

    pub fn list<T: HarObject>(&mut self, key: &str, values: &[T]) {
        let items: Vec<Value> = values
            .iter()
            .map(|v| v.to_value(self.include_nulls))
            .collect();
        self.put(key, items);
    }

    pub fn opt_list<T: HarObject>(&mut self, key: &str, values: Option<&[T]>) {
        match values {
            Some(values) => self.list(key, values),
            None => self.put(key, Value::Null),
        }
    }

    pub fn opt_enum<T: HarEnum>(&mut self, key: &str, value: Option<T>) {
        self.opt_str(key, value.map(|v| v.as_str()));
    }

    pub fn opt_value(&mut self, key: &str, value: Option<&Value>) {
        self.put(key, value.cloned().unwrap_or(Value::Null));
    }

    /// Add `comment`, prune nulls, then splice `custom` in unchanged.
    pub fn finish(mut self, comment: Option<&str>, custom: &JsonObject) -> JsonObject {
        self.opt_str("comment", comment);
        let mut map = json::prune_nulls(self.map, self.include_nulls);
        for (key, value) in custom {
            map.insert(key.clone(), value.clone());
        }
        map
    }
}
