//! Conversions between domain values and `SQLite` column values.

use std::time::Duration;

use chrono::SecondsFormat;
use sensorhub_domain::time::Timestamp;

/// Wrap any conversion failure as a row decoding error.
pub(crate) fn decode_error<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}

/// Encode a timestamp as fixed-width RFC 3339 UTC text.
///
/// Every value carries nanoseconds and a `Z` suffix, so comparing the
/// strings compares the instants.
pub(crate) fn encode_timestamp(at: Timestamp) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn decode_timestamp(value: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.to_utc())
        .map_err(decode_error)
}

/// Encode an interval as whole seconds.
///
/// Intervals beyond `i64::MAX` seconds fail instead of being clamped.
pub(crate) fn encode_duration(every: Duration) -> Result<i64, sqlx::Error> {
    i64::try_from(every.as_secs()).map_err(|err| sqlx::Error::Encode(Box::new(err)))
}

pub(crate) fn decode_duration(seconds: i64) -> Result<Duration, sqlx::Error> {
    u64::try_from(seconds)
        .map(Duration::from_secs)
        .map_err(decode_error)
}
