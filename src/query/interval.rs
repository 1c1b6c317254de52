//! Query time intervals
//!
//! A `TimeInterval` is the full range a benchmark run queries over. Bounds are
//! rendered per dialect so each language can format them the way its server
//! expects.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::Language;

/// Half-open time interval: [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    /// Create a new interval, returning None if start is after end
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        if start <= end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Parse an interval from two RFC-3339 timestamps
    pub fn parse(start: &str, end: &str) -> Option<Self> {
        let start = DateTime::parse_from_rfc3339(start).ok()?.with_timezone(&Utc);
        let end = DateTime::parse_from_rfc3339(end).ok()?.with_timezone(&Utc);
        Self::new(start, end)
    }

    /// Interval from unix timestamps in seconds
    pub fn from_unix_secs(start: i64, end: i64) -> Option<Self> {
        let start = Utc.timestamp_opt(start, 0).single()?;
        let end = Utc.timestamp_opt(end, 0).single()?;
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// Render the start bound for the given dialect
    pub fn start_string(&self, language: Language) -> String {
        render(self.start, language)
    }

    /// Render the end bound for the given dialect
    pub fn end_string(&self, language: Language) -> String {
        render(self.end, language)
    }
}

/// Format a timestamp as a query literal for `language`.
///
/// Both dialects currently accept absolute RFC-3339 timestamps with second
/// precision, e.g. `2020-01-01T00:00:00Z`.
pub fn render(instant: DateTime<Utc>, language: Language) -> String {
    match language {
        Language::InfluxQL => instant.to_rfc3339_opts(SecondsFormat::Secs, true),
        Language::Flux => instant.to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_rejects_reversed_bounds() {
        assert!(TimeInterval::parse("2020-01-02T00:00:00Z", "2020-01-01T00:00:00Z").is_none());
        assert!(TimeInterval::parse("2020-01-01T00:00:00Z", "2020-01-01T00:00:00Z").is_some());
    }

    #[test]
    fn test_interval_rendering() {
        let interval =
            TimeInterval::parse("2020-01-01T00:00:00Z", "2020-01-02T00:00:00Z").unwrap();

        assert_eq!(interval.start_string(Language::Flux), "2020-01-01T00:00:00Z");
        assert_eq!(interval.end_string(Language::Flux), "2020-01-02T00:00:00Z");
        assert_eq!(interval.start_string(Language::InfluxQL), "2020-01-01T00:00:00Z");
        assert_eq!(interval.duration(), chrono::Duration::days(1));
    }

    #[test]
    fn test_interval_normalizes_offsets() {
        let interval =
            TimeInterval::parse("2020-01-01T02:00:00+02:00", "2020-01-01T12:00:00Z").unwrap();
        assert_eq!(interval.start_string(Language::Flux), "2020-01-01T00:00:00Z");
    }

    #[test]
    fn test_from_unix_secs() {
        let interval = TimeInterval::from_unix_secs(1_577_836_800, 1_577_923_200).unwrap();
        assert_eq!(interval.to_string(), "[2020-01-01T00:00:00Z, 2020-01-02T00:00:00Z)");
    }
}
