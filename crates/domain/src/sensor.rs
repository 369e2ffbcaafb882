//! Sensor: a single measuring channel on a device.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::SensorId;
use crate::update::UpdateMode;
use crate::validation::{validate_serial_number, validate_title};

/// Inclusive bounds of the values a sensor type may report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueBounds {
    pub min: f64,
    pub max: f64,
}

/// What a sensor measures. A device has at most one sensor per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorDataType {
    #[serde(rename = "pH")]
    Ph,
    #[serde(rename = "CO2")]
    Co2,
    Temperature,
}

impl SensorDataType {
    pub const ALL: [Self; 3] = [Self::Ph, Self::Co2, Self::Temperature];

    /// Canonical name, as used on the wire and in storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ph => "pH",
            Self::Co2 => "CO2",
            Self::Temperature => "Temperature",
        }
    }

    #[must_use]
    pub fn bounds(self) -> ValueBounds {
        match self {
            Self::Ph => ValueBounds {
                min: 0.0,
                max: 14.0,
            },
            Self::Co2 => ValueBounds {
                min: 0.0,
                max: 100.0,
            },
            Self::Temperature => ValueBounds {
                min: -40.0,
                max: 127.0,
            },
        }
    }

    /// Check that `value` lies within this type's inclusive bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonFiniteValue`],
    /// [`ValidationError::ValueBelowMinimum`], or
    /// [`ValidationError::ValueAboveMaximum`].
    pub fn check(self, value: f64) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { data_type: self });
        }
        let ValueBounds { min, max } = self.bounds();
        if value < min {
            return Err(ValidationError::ValueBelowMinimum {
                data_type: self,
                value,
                min,
            });
        }
        if value > max {
            return Err(ValidationError::ValueAboveMaximum {
                data_type: self,
                value,
                max,
            });
        }
        Ok(())
    }
}

impl fmt::Display for SensorDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorDataType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|data_type| data_type.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownDataType {
                given: Some(s.to_owned()),
            })
    }
}

/// A sensor belonging to exactly one device, referenced by the device's
/// serial number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: SensorId,
    pub title: String,
    pub serial_number: String,
    /// Serial number of the parent device.
    pub device: String,
    pub data_type: SensorDataType,
}

impl Sensor {
    /// Create a builder for constructing a [`Sensor`].
    #[must_use]
    pub fn builder() -> SensorBuilder {
        SensorBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the title, serial number, or device
    /// reference is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_serial_number(&self.serial_number)?;
        if self.device.trim().is_empty() {
            return Err(ValidationError::MissingField("device"));
        }
        Ok(())
    }

    /// Apply a set of changes, returning the updated sensor.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] when a full update omits a
    /// required field, or any invariant violation of the result.
    pub fn apply(mut self, changes: SensorChanges, mode: UpdateMode) -> Result<Self, ValidationError> {
        if let Some(title) = mode.require(changes.title, "title")? {
            self.title = title;
        }
        if let Some(serial_number) = mode.require(changes.serial_number, "serial_number")? {
            self.serial_number = serial_number;
        }
        if let Some(device) = mode.require(changes.device, "device")? {
            self.device = device;
        }
        if let Some(data_type) = mode.require(changes.data_type, "data_type")? {
            self.data_type = data_type;
        }
        self.validate()?;
        Ok(self)
    }
}

/// Attributes supplied when registering a sensor.
#[derive(Debug, Clone)]
pub struct NewSensor {
    pub title: String,
    pub serial_number: String,
    /// Serial number of the device the sensor is mounted on.
    pub device: String,
    pub data_type: SensorDataType,
}

impl NewSensor {
    /// Build the sensor.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if any invariant fails.
    pub fn into_sensor(self) -> Result<Sensor, ValidationError> {
        Sensor::builder()
            .title(self.title)
            .serial_number(self.serial_number)
            .device(self.device)
            .data_type(self.data_type)
            .build()
    }
}

/// Fields a sensor update may touch.
#[derive(Debug, Clone, Default)]
pub struct SensorChanges {
    pub title: Option<String>,
    pub serial_number: Option<String>,
    pub device: Option<String>,
    pub data_type: Option<SensorDataType>,
}

/// Step-by-step builder for [`Sensor`].
#[derive(Debug, Default)]
pub struct SensorBuilder {
    id: Option<SensorId>,
    title: Option<String>,
    serial_number: Option<String>,
    device: Option<String>,
    data_type: Option<SensorDataType>,
}

impl SensorBuilder {
    #[must_use]
    pub fn id(mut self, id: SensorId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    #[must_use]
    pub fn device(mut self, device_serial_number: impl Into<String>) -> Self {
        self.device = Some(device_serial_number.into());
        self
    }

    #[must_use]
    pub fn data_type(mut self, data_type: SensorDataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    /// Consume the builder, validate, and return a [`Sensor`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownDataType`] when no data type was
    /// given, or any other invariant violation.
    pub fn build(self) -> Result<Sensor, ValidationError> {
        let data_type = self
            .data_type
            .ok_or(ValidationError::UnknownDataType { given: None })?;
        let sensor = Sensor {
            id: self.id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            serial_number: self.serial_number.unwrap_or_default(),
            device: self.device.unwrap_or_default(),
            data_type,
        };
        sensor.validate()?;
        Ok(sensor)
    }
}
