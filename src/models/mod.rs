//! Core value types shared across the monitor, dispatcher and bot glue.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed occurrence of the galaxy tick, identified by the raw
/// ISO-8601 timestamp string the feed reports.
///
/// Equality is exact string equality. Two representations of the same
/// instant that differ textually are treated as different ticks, and no
/// ordering check is performed between values; the feed is the sole
/// authority on what counts as "new".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickValue(String);

impl TickValue {
    /// Wraps a raw timestamp string as reported by the feed.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw timestamp string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the value as an RFC 3339 instant. Returns `None` if the feed
    /// handed us something unparsable; callers degrade to the raw string.
    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.0).ok().map(|dt| dt.with_timezone(&Utc))
    }
}

impl fmt::Display for TickValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a notification destination (a Discord channel id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationId(u64);

impl DestinationId {
    /// Wraps a raw channel id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw channel id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn tick_value_parses_rfc3339() {
        let tick = TickValue::new("2025-01-01T00:00:00Z");
        let expected = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(tick.as_instant(), Some(expected));
    }

    #[test]
    fn tick_value_parses_offset_timestamps() {
        let tick = TickValue::new("2025-06-15T14:30:00+02:00");
        let expected = Utc.with_ymd_and_hms(2025, 6, 15, 12, 30, 0).unwrap();
        assert_eq!(tick.as_instant(), Some(expected));
    }

    #[test]
    fn tick_value_rejects_garbage() {
        assert_eq!(TickValue::new("not a timestamp").as_instant(), None);
    }

    #[test]
    fn equality_is_textual_not_temporal() {
        // Same instant, different spelling: still a different tick.
        let a = TickValue::new("2025-01-01T00:00:00Z");
        let b = TickValue::new("2025-01-01T00:00:00+00:00");
        assert_ne!(a, b);
    }
}
