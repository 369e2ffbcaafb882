//! Field rules shared by every entity and the per-sensor-type value check.

use std::time::Duration;

use crate::error::ValidationError;
use crate::sensor::SensorDataType;

/// Maximum length, in characters, of any entity title.
pub const TITLE_MAX_LEN: usize = 120;

/// Maximum length, in characters, of any serial number.
pub const SERIAL_NUMBER_MAX_LEN: usize = 16;

/// Check a hub, device, or sensor title.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyTitle`] or [`ValidationError::TitleTooLong`].
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(ValidationError::TitleTooLong { max: TITLE_MAX_LEN });
    }
    Ok(())
}

/// Check a hub, device, or sensor serial number.
///
/// # Errors
///
/// Returns [`ValidationError::EmptySerialNumber`] or
/// [`ValidationError::SerialNumberTooLong`].
pub fn validate_serial_number(serial_number: &str) -> Result<(), ValidationError> {
    if serial_number.trim().is_empty() {
        return Err(ValidationError::EmptySerialNumber);
    }
    if serial_number.chars().count() > SERIAL_NUMBER_MAX_LEN {
        return Err(ValidationError::SerialNumberTooLong {
            max: SERIAL_NUMBER_MAX_LEN,
        });
    }
    Ok(())
}

/// Longest polling or update interval, in seconds, that storage can hold.
pub const INTERVAL_MAX_SECS: u64 = i64::MAX.unsigned_abs();

/// Check a polling or update interval named `field`.
///
/// # Errors
///
/// Returns [`ValidationError::IntervalTooLong`] above [`INTERVAL_MAX_SECS`].
pub fn validate_interval(field: &'static str, every: Duration) -> Result<(), ValidationError> {
    if every.as_secs() > INTERVAL_MAX_SECS {
        return Err(ValidationError::IntervalTooLong {
            field,
            max: INTERVAL_MAX_SECS,
        });
    }
    Ok(())
}

/// Validate a collected value against the bounds of a sensor data type
/// given by name.
///
/// An absent or unrecognised `data_type` always fails. A value of `0` is
/// checked like any other value.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownDataType`] for an absent or unknown type,
/// otherwise whatever [`SensorDataType::check`] reports.
pub fn validate(data_type: Option<&str>, value: f64) -> Result<SensorDataType, ValidationError> {
    let data_type: SensorDataType = data_type
        .ok_or(ValidationError::UnknownDataType { given: None })?
        .parse()?;
    data_type.check(value)?;
    Ok(data_type)
}
