//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

use crate::error::ValidationError;

/// UTC timestamp used for reading collection times.
pub type Timestamp = DateTime<Utc>;

/// Parse an ISO-8601 / RFC 3339 timestamp such as `2019-02-07T08:10:22Z`.
///
/// Offsets other than `Z` are accepted and normalised to UTC.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTimestamp`] when `value` is not a valid
/// RFC 3339 timestamp.
pub fn parse_timestamp(value: &str) -> Result<Timestamp, ValidationError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.to_utc())
        .map_err(|_| ValidationError::InvalidTimestamp(value.to_owned()))
}

/// A closed interval `[start, end]` of collection timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    #[must_use]
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Build a range from the raw `start_datetime` / `end_datetime` query
    /// parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] when a bound is absent and
    /// [`ValidationError::InvalidTimestamp`] when one cannot be parsed.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, ValidationError> {
        let start = start.ok_or(ValidationError::MissingField("start_datetime"))?;
        let end = end.ok_or(ValidationError::MissingField("end_datetime"))?;
        Ok(Self::new(parse_timestamp(start)?, parse_timestamp(end)?))
    }

    /// Whether `at` lies within the range, both bounds included.
    ///
    /// A range whose `start` is after its `end` contains nothing.
    #[must_use]
    pub fn contains(&self, at: Timestamp) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Serde adapter encoding a [`std::time::Duration`] as whole seconds.
pub mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    /// # Errors
    ///
    /// Fails when the input is not an unsigned integer.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }

    /// Same encoding for optional fields of partial updates.
    pub mod option {
        use std::time::Duration;

        use serde::{Deserialize, Deserializer, Serializer};

        /// # Errors
        ///
        /// Propagates serializer failures.
        pub fn serialize<S: Serializer>(
            value: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(duration) => serializer.serialize_some(&duration.as_secs()),
                None => serializer.serialize_none(),
            }
        }

        /// # Errors
        ///
        /// Fails when the input is neither null nor an unsigned integer.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Duration>, D::Error> {
            Option::<u64>::deserialize(deserializer).map(|secs| secs.map(Duration::from_secs))
        }
    }
}
