//! Time utilities and constants for RateWatch.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Timing constants.
pub mod constants {
    use super::Duration;

    /// Period between scheduled refreshes (60 seconds).
    pub fn refresh_interval() -> Duration {
        Duration::seconds(60)
    }

    /// Upper bound on a single fetch (10 seconds).
    pub fn request_timeout() -> Duration {
        Duration::seconds(10)
    }
}

/// A timestamp (always UTC).
pub type Timestamp = DateTime<Utc>;

/// A parsed observation time. `None` marks an unparseable value, which
/// orders before every parsed timestamp.
pub type ObservedAt = Option<Timestamp>;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Parse an observation time.
///
/// Accepts RFC 3339 and the common `YYYY-MM-DD[ T]HH:MM[:SS[.fff]]` and
/// `YYYY-MM-DD` forms. Values without an offset are read as UTC.
pub fn parse_timestamp(raw: &str) -> ObservedAt {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Epoch milliseconds of an observation, `0` when it did not parse.
pub fn epoch_millis(observed: ObservedAt) -> i64 {
    observed.map(|ts| ts.timestamp_millis()).unwrap_or(0)
}

/// Duration extensions for convenient construction.
pub trait DurationExt {
    fn as_std(&self) -> std::time::Duration;
}

impl DurationExt for Duration {
    fn as_std(&self) -> std::time::Duration {
        self.to_std().unwrap_or(std::time::Duration::ZERO)
    }
}
