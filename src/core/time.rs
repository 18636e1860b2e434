//! Shared timestamp helpers.

use crate::core::error::MakotoError;
use chrono::{DateTime, Duration, TimeZone, Utc};
use mongodb::bson;

/// Build a UTC instant, rejecting impossible calendar values.
pub fn utc_datetime(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<DateTime<Utc>, MakotoError> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .ok_or_else(|| {
            MakotoError::ValidationError(format!(
                "invalid UTC timestamp {year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}"
            ))
        })
}

pub fn days_after(base: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    base + Duration::days(days)
}

/// Second-precision ISO-8601 with a literal `Z` (e.g. `2024-01-03T03:00:00Z`).
pub fn iso_z(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Wall-clock instant stamped on documents written during this run.
pub fn run_timestamp() -> bson::DateTime {
    bson::DateTime::now()
}

pub fn to_bson_datetime(ts: &DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(ts.timestamp_millis())
}
