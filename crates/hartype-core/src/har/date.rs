use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde_json::Value;
use std::fmt;

/// A HAR timestamp that remembers how it was written.
///
/// HAR producers disagree on date formats, so the source value (a string, or
/// a number of epoch milliseconds) is kept next to the parsed instant and
/// written back verbatim. Values built in code have no source and are written
/// as RFC 3339.
///
/// Equality compares the instant only.
#[derive(Debug, Clone)]
pub struct HarDate {
    value: DateTime<FixedOffset>,
    raw: Option<Value>,
}

impl HarDate {
    pub fn new(value: DateTime<FixedOffset>) -> Self {
        Self { value, raw: None }
    }

    /// Unix epoch in UTC, the fallback for missing or unreadable dates.
    pub fn epoch() -> Self {
        Self::new(DateTime::<Utc>::default().fixed_offset())
    }

    /// Attach the source string this value was read from.
    pub fn with_raw(self, raw: impl Into<String>) -> Self {
        self.with_raw_value(Value::String(raw.into()))
    }

    /// Attach the source JSON value this value was read from.
    pub fn with_raw_value(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn value(&self) -> DateTime<FixedOffset> {
        self.value
    }

    /// The source string, when the value was read from one.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_ref().and_then(Value::as_str)
    }

    pub fn raw_value(&self) -> Option<&Value> {
        self.raw.as_ref()
    }

    /// Text form: the source string if there was one, else RFC 3339.
    pub fn to_har_string(&self) -> String {
        match self.raw() {
            Some(raw) => raw.to_string(),
            None => self.value.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

impl Default for HarDate {
    fn default() -> Self {
        Self::epoch()
    }
}

impl PartialEq for HarDate {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl From<DateTime<FixedOffset>> for HarDate {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::new(value)
    }
}

impl From<DateTime<Utc>> for HarDate {
    fn from(value: DateTime<Utc>) -> Self {
        Self::new(value.fixed_offset())
    }
}

impl From<&HarDate> for Value {
    fn from(date: &HarDate) -> Self {
        match &date.raw {
            Some(raw) => raw.clone(),
            None => Value::String(date.to_har_string()),
        }
    }
}

impl fmt::Display for HarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_har_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_programmatic_date_is_rfc3339() {
        let date = HarDate::from(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());
        assert_eq!(date.to_har_string(), "2024-03-01T12:30:00Z");
        assert!(date.raw().is_none());
    }

    #[test]
    fn test_raw_string_wins() {
        let date = HarDate::from(Utc.with_ymd_and_hms(2012, 7, 15, 8, 0, 0).unwrap())
            .with_raw("Sun, 15 Jul 2012 08:00:00 GMT");
        assert_eq!(date.to_har_string(), "Sun, 15 Jul 2012 08:00:00 GMT");
    }

    #[test]
    fn test_epoch_millis_source_is_written_back_as_number() {
        let instant = Utc.with_ymd_and_hms(2012, 7, 15, 8, 0, 0).unwrap();
        let date = HarDate::from(instant).with_raw_value(Value::from(1342339200000_i64));

        assert_eq!(Value::from(&date), Value::from(1342339200000_i64));
        assert!(date.raw().is_none());
        assert_eq!(date.to_har_string(), "2012-07-15T08:00:00Z");
    }

    #[test]
    fn test_equality_ignores_raw() {
        let instant = Utc.with_ymd_and_hms(2012, 7, 15, 8, 0, 0).unwrap();
        let parsed = HarDate::from(instant).with_raw("2012-07-15T10:00:00+02:00");
        assert_eq!(parsed, HarDate::from(instant));
        assert_ne!(HarDate::epoch(), HarDate::from(instant));
    }
}
