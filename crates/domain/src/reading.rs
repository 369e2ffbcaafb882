//! Reading: one value collected by a sensor at a point in time.
//!
//! Readings are append-only. A [`NewReading`] becomes persistable only by
//! passing through [`NewReading::validate`], which checks the value against
//! the bounds of the owning sensor's data type and yields a
//! [`ValidatedReading`].

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::ReadingId;
use crate::sensor::SensorDataType;
use crate::time::Timestamp;
use crate::validation::validate_serial_number;

/// Value recorded when a submission omits it.
pub const DEFAULT_VALUE: f64 = 0.1;

/// A persisted sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: ReadingId,
    /// Unique across every reading in the system.
    pub date_time_collected: Timestamp,
    /// Serial number of the sensor that produced the value.
    pub sensor: String,
    pub value: f64,
}

/// A reading as submitted, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub date_time_collected: Timestamp,
    /// Serial number of the sensor that produced the value.
    pub sensor: String,
    pub value: f64,
}

impl NewReading {
    #[must_use]
    pub fn new(date_time_collected: Timestamp, sensor: impl Into<String>, value: f64) -> Self {
        Self {
            date_time_collected,
            sensor: sensor.into(),
            value,
        }
    }

    /// Validate against the data type of the sensor named by `self.sensor`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the sensor reference is empty or the
    /// value falls outside the bounds of `data_type`.
    pub fn validate(self, data_type: SensorDataType) -> Result<ValidatedReading, ValidationError> {
        validate_serial_number(&self.sensor)?;
        data_type.check(self.value)?;
        Ok(ValidatedReading {
            reading: Reading {
                id: ReadingId::new(),
                date_time_collected: self.date_time_collected,
                sensor: self.sensor,
                value: self.value,
            },
            data_type,
        })
    }
}

/// A reading that passed value validation and may be persisted.
///
/// Only [`NewReading::validate`] constructs this type.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedReading {
    reading: Reading,
    data_type: SensorDataType,
}

impl ValidatedReading {
    #[must_use]
    pub fn reading(&self) -> &Reading {
        &self.reading
    }

    /// Data type the value was validated against. Storage re-checks that
    /// the sensor still has this type when persisting.
    #[must_use]
    pub fn data_type(&self) -> SensorDataType {
        self.data_type
    }

    #[must_use]
    pub fn into_reading(self) -> Reading {
        self.reading
    }
}
