//! Device: a physical unit attached to a hub; owns sensors.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::DeviceId;
use crate::time::duration_secs;
use crate::update::UpdateMode;
use crate::validation::{validate_interval, validate_serial_number, validate_title};

/// Default interval at which a device polls its sensors.
pub const DEFAULT_SENSORS_DATA_FETCH_TIME: Duration = Duration::from_secs(5);

/// A device belonging to exactly one hub, referenced by the hub's serial
/// number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub title: String,
    pub serial_number: String,
    /// Serial number of the parent hub.
    pub hub: String,
    #[serde(with = "duration_secs")]
    pub sensors_data_fetch_time: Duration,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the title, serial number, hub
    /// reference, or polling interval is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_serial_number(&self.serial_number)?;
        if self.hub.trim().is_empty() {
            return Err(ValidationError::MissingField("hub"));
        }
        validate_interval("sensors_data_fetch_time", self.sensors_data_fetch_time)
    }

    /// Apply a set of changes, returning the updated device.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] when a full update omits a
    /// required field, or any invariant violation of the result.
    pub fn apply(mut self, changes: DeviceChanges, mode: UpdateMode) -> Result<Self, ValidationError> {
        if let Some(title) = mode.require(changes.title, "title")? {
            self.title = title;
        }
        if let Some(serial_number) = mode.require(changes.serial_number, "serial_number")? {
            self.serial_number = serial_number;
        }
        if let Some(hub) = mode.require(changes.hub, "hub")? {
            self.hub = hub;
        }
        if let Some(every) = changes.sensors_data_fetch_time {
            self.sensors_data_fetch_time = every;
        }
        self.validate()?;
        Ok(self)
    }
}

/// Attributes supplied when registering a device.
#[derive(Debug, Clone, Default)]
pub struct NewDevice {
    pub title: String,
    pub serial_number: String,
    /// Serial number of the hub the device is attached to.
    pub hub: String,
    pub sensors_data_fetch_time: Option<Duration>,
}

impl NewDevice {
    /// Build the device.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if any invariant fails.
    pub fn into_device(self) -> Result<Device, ValidationError> {
        let mut builder = Device::builder()
            .title(self.title)
            .serial_number(self.serial_number)
            .hub(self.hub);
        if let Some(every) = self.sensors_data_fetch_time {
            builder = builder.sensors_data_fetch_time(every);
        }
        builder.build()
    }
}

/// Fields a device update may touch.
#[derive(Debug, Clone, Default)]
pub struct DeviceChanges {
    pub title: Option<String>,
    pub serial_number: Option<String>,
    pub hub: Option<String>,
    pub sensors_data_fetch_time: Option<Duration>,
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    title: Option<String>,
    serial_number: Option<String>,
    hub: Option<String>,
    sensors_data_fetch_time: Option<Duration>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: DeviceId) -> Self {
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
    pub fn hub(mut self, hub_serial_number: impl Into<String>) -> Self {
        self.hub = Some(hub_serial_number.into());
        self
    }

    #[must_use]
    pub fn sensors_data_fetch_time(mut self, every: Duration) -> Self {
        self.sensors_data_fetch_time = Some(every);
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if a required field is missing or invalid.
    pub fn build(self) -> Result<Device, ValidationError> {
        let device = Device {
            id: self.id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            serial_number: self.serial_number.unwrap_or_default(),
            hub: self.hub.unwrap_or_default(),
            sensors_data_fetch_time: self
                .sensors_data_fetch_time
                .unwrap_or(DEFAULT_SENSORS_DATA_FETCH_TIME),
        };
        device.validate()?;
        Ok(device)
    }
}
