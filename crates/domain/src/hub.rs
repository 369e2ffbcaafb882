//! Hub: the root of a user's hierarchy; owns devices.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::{HubId, UserId};
use crate::time::duration_secs;
use crate::update::UpdateMode;
use crate::validation::{validate_interval, validate_serial_number, validate_title};

/// Default interval at which a hub polls its devices.
pub const DEFAULT_DEVICES_DATA_FETCH_TIME: Duration = Duration::from_secs(300);

/// Default interval at which a hub pushes its own data upstream.
pub const DEFAULT_HUB_DATA_UPDATE_TIME: Duration = Duration::from_secs(600);

/// A gateway owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hub {
    pub id: HubId,
    pub title: String,
    pub serial_number: String,
    pub owner: UserId,
    #[serde(with = "duration_secs")]
    pub devices_data_fetch_time: Duration,
    #[serde(with = "duration_secs")]
    pub hub_data_update_time: Duration,
}

impl Hub {
    /// Create a builder for constructing a [`Hub`].
    #[must_use]
    pub fn builder() -> HubBuilder {
        HubBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the title, serial number, or an
    /// interval is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_serial_number(&self.serial_number)?;
        validate_interval("devices_data_fetch_time", self.devices_data_fetch_time)?;
        validate_interval("hub_data_update_time", self.hub_data_update_time)
    }

    /// Apply a set of changes, returning the updated hub.
    ///
    /// The owner never changes through an update.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] when a full update omits a
    /// required field, or any invariant violation of the result.
    pub fn apply(mut self, changes: HubChanges, mode: UpdateMode) -> Result<Self, ValidationError> {
        if let Some(title) = mode.require(changes.title, "title")? {
            self.title = title;
        }
        if let Some(serial_number) = mode.require(changes.serial_number, "serial_number")? {
            self.serial_number = serial_number;
        }
        if let Some(every) = changes.devices_data_fetch_time {
            self.devices_data_fetch_time = every;
        }
        if let Some(every) = changes.hub_data_update_time {
            self.hub_data_update_time = every;
        }
        self.validate()?;
        Ok(self)
    }
}

/// Attributes supplied when a principal registers a hub. The owner is
/// always the creating principal.
#[derive(Debug, Clone, Default)]
pub struct NewHub {
    pub title: String,
    pub serial_number: String,
    pub devices_data_fetch_time: Option<Duration>,
    pub hub_data_update_time: Option<Duration>,
}

impl NewHub {
    /// Build the hub owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if any invariant fails.
    pub fn into_hub(self, owner: UserId) -> Result<Hub, ValidationError> {
        let mut builder = Hub::builder()
            .title(self.title)
            .serial_number(self.serial_number)
            .owner(owner);
        if let Some(every) = self.devices_data_fetch_time {
            builder = builder.devices_data_fetch_time(every);
        }
        if let Some(every) = self.hub_data_update_time {
            builder = builder.hub_data_update_time(every);
        }
        builder.build()
    }
}

/// Fields a hub update may touch.
#[derive(Debug, Clone, Default)]
pub struct HubChanges {
    pub title: Option<String>,
    pub serial_number: Option<String>,
    pub devices_data_fetch_time: Option<Duration>,
    pub hub_data_update_time: Option<Duration>,
}

/// Step-by-step builder for [`Hub`].
#[derive(Debug, Default)]
pub struct HubBuilder {
    id: Option<HubId>,
    title: Option<String>,
    serial_number: Option<String>,
    owner: Option<UserId>,
    devices_data_fetch_time: Option<Duration>,
    hub_data_update_time: Option<Duration>,
}

impl HubBuilder {
    #[must_use]
    pub fn id(mut self, id: HubId) -> Self {
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
    pub fn owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    #[must_use]
    pub fn devices_data_fetch_time(mut self, every: Duration) -> Self {
        self.devices_data_fetch_time = Some(every);
        self
    }

    #[must_use]
    pub fn hub_data_update_time(mut self, every: Duration) -> Self {
        self.hub_data_update_time = Some(every);
        self
    }

    /// Consume the builder, validate, and return a [`Hub`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the owner is missing, or the title or
    /// serial number is missing or invalid.
    pub fn build(self) -> Result<Hub, ValidationError> {
        let owner = self.owner.ok_or(ValidationError::MissingField("owner"))?;
        let hub = Hub {
            id: self.id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            serial_number: self.serial_number.unwrap_or_default(),
            owner,
            devices_data_fetch_time: self
                .devices_data_fetch_time
                .unwrap_or(DEFAULT_DEVICES_DATA_FETCH_TIME),
            hub_data_update_time: self
                .hub_data_update_time
                .unwrap_or(DEFAULT_HUB_DATA_UPDATE_TIME),
        };
        hub.validate()?;
        Ok(hub)
    }
}
