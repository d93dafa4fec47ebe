// ── Server timestamps ──
//
// The server's date format is not fixed: RFC 3339 with an offset, naive
// ISO date-times, and bare dates all appear. A Timestamp keeps the raw
// wire value for round-tripping and parses what it can for ordering and
// calendar-date filtering.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone)]
pub struct Timestamp {
    raw: Value,
    instant: Option<DateTime<Utc>>,
    date: Option<NaiveDate>,
}

impl Timestamp {
    /// Read a timestamp from a wire value. Only strings and numbers
    /// (epoch seconds) are accepted; empty strings count as absent.
    pub fn from_wire(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self::parse(s)),
            Value::Number(n) => {
                let instant = n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0));
                Some(Self {
                    raw: value.clone(),
                    instant,
                    date: instant.map(|i| i.date_naive()),
                })
            }
            _ => None,
        }
    }

    /// Parse a textual timestamp. Unparseable text is kept with no
    /// instant and no calendar date.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let (instant, date) = if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            // Calendar date as written, before shifting to UTC.
            (Some(dt.with_timezone(&Utc)), Some(dt.date_naive()))
        } else if let Some(naive) = NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        {
            (Some(naive.and_utc()), Some(naive.date()))
        } else if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            (day.and_hms_opt(0, 0, 0).map(|n| n.and_utc()), Some(day))
        } else {
            (None, None)
        };

        Self {
            raw: Value::String(text.to_owned()),
            instant,
            date,
        }
    }

    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        Self {
            raw: Value::String(instant.to_rfc3339()),
            instant: Some(instant),
            date: Some(instant.date_naive()),
        }
    }

    /// The value exactly as the server sent it.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.instant
    }

    /// Calendar date in the timestamp's own offset.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Order two timestamps. `None` when either side is unparseable.
    pub fn cmp_instant(&self, other: &Self) -> Option<Ordering> {
        Some(self.instant?.cmp(&other.instant?))
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rfc3339_keeps_local_calendar_date() {
        let ts = Timestamp::parse("2024-02-01T01:00:00+03:00");
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(ts.instant().unwrap().date_naive(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn naive_iso_is_accepted() {
        let ts = Timestamp::parse("2024-01-15T10:30:00.123456");
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn bare_date_is_midnight() {
        let ts = Timestamp::parse("2024-01-15");
        assert_eq!(ts.instant().unwrap().to_rfc3339(), "2024-01-15T00:00:00+00:00");
    }

    #[test]
    fn garbage_keeps_raw_text() {
        let ts = Timestamp::parse("yesterday");
        assert!(ts.instant().is_none());
        assert!(ts.date().is_none());
        assert_eq!(ts.to_string(), "yesterday");
        assert_eq!(serde_json::to_value(&ts).unwrap(), json!("yesterday"));
    }

    #[test]
    fn wire_skips_empty_and_null() {
        assert!(Timestamp::from_wire(&json!("")).is_none());
        assert!(Timestamp::from_wire(&Value::Null).is_none());
    }

    #[test]
    fn ordering_needs_both_instants() {
        let a = Timestamp::parse("2024-01-01T00:00:00Z");
        let b = Timestamp::parse("2024-01-02T00:00:00Z");
        assert_eq!(a.cmp_instant(&b), Some(Ordering::Less));
        assert_eq!(a.cmp_instant(&Timestamp::parse("n/a")), None);
    }
}
