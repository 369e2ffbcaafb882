//! Ownership resolution along the Reading → Sensor → Device → Hub chain.
//!
//! Every entity is owned by exactly one user: the owner of the hub at the top
//! of its chain. Existence is checked before ownership, so a missing target
//! is reported as not found even to a principal who could never own it.

use sensorhub_domain::device::Device;
use sensorhub_domain::error::{NotFoundError, PermissionDeniedError, SensorHubError};
use sensorhub_domain::hub::Hub;
use sensorhub_domain::id::{DeviceId, HubId, ReadingId, SensorId, UserId};
use sensorhub_domain::kind::EntityKind;
use sensorhub_domain::principal::Principal;
use sensorhub_domain::reading::Reading;
use sensorhub_domain::sensor::Sensor;

use crate::ports::{DeviceRepository, HubRepository, ReadingRepository, SensorRepository};
use crate::store::Store;

/// A reference to any entity of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Hub(HubId),
    Device(DeviceId),
    Sensor(SensorId),
    Reading(ReadingId),
}

impl Resource {
    #[must_use]
    pub fn kind(self) -> EntityKind {
        match self {
            Self::Hub(_) => EntityKind::Hub,
            Self::Device(_) => EntityKind::Device,
            Self::Sensor(_) => EntityKind::Sensor,
            Self::Reading(_) => EntityKind::Reading,
        }
    }

    fn id(self) -> String {
        match self {
            Self::Hub(id) => id.to_string(),
            Self::Device(id) => id.to_string(),
            Self::Sensor(id) => id.to_string(),
            Self::Reading(id) => id.to_string(),
        }
    }
}

/// Answers "who owns this?" and "may this principal act on it?".
pub struct OwnershipResolver<H, D, S, R> {
    store: Store<H, D, S, R>,
}

impl<H, D, S, R> Clone for OwnershipResolver<H, D, S, R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<H, D, S, R> OwnershipResolver<H, D, S, R>
where
    H: HubRepository,
    D: DeviceRepository,
    S: SensorRepository,
    R: ReadingRepository,
{
    pub fn new(store: Store<H, D, S, R>) -> Self {
        Self { store }
    }

    /// Resolve the owner of `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`] when the resource, or any link of
    /// its chain, does not exist.
    pub async fn owner_of(&self, resource: Resource) -> Result<UserId, SensorHubError> {
        match resource {
            Resource::Hub(id) => Ok(self.hub(id).await?.owner),
            Resource::Device(id) => {
                let device = self.device(id).await?;
                self.device_owner(&device).await
            }
            Resource::Sensor(id) => {
                let sensor = self.sensor(id).await?;
                self.sensor_owner(&sensor).await
            }
            Resource::Reading(id) => {
                let reading = self.reading(id).await?;
                self.reading_owner(&reading).await
            }
        }
    }

    /// Whether `principal` owns `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`] when the resource does not exist.
    pub async fn is_owned_by(
        &self,
        resource: Resource,
        principal: &Principal,
    ) -> Result<bool, SensorHubError> {
        Ok(principal.owns(self.owner_of(resource).await?))
    }

    /// Succeed only when `principal` owns `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`] first, then
    /// [`SensorHubError::PermissionDenied`] for a resource owned by someone
    /// else.
    pub async fn authorize(
        &self,
        resource: Resource,
        principal: &Principal,
    ) -> Result<(), SensorHubError> {
        let owner = self.owner_of(resource).await?;
        ensure_owner(resource, owner, principal)
    }

    /// Load a hub on behalf of `principal`.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`] or
    /// [`SensorHubError::PermissionDenied`].
    pub async fn owned_hub(&self, id: HubId, principal: &Principal) -> Result<Hub, SensorHubError> {
        let hub = self.hub(id).await?;
        ensure_owner(Resource::Hub(id), hub.owner, principal)?;
        Ok(hub)
    }

    /// Load a device on behalf of `principal`.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`] or
    /// [`SensorHubError::PermissionDenied`].
    pub async fn owned_device(
        &self,
        id: DeviceId,
        principal: &Principal,
    ) -> Result<Device, SensorHubError> {
        let device = self.device(id).await?;
        let owner = self.device_owner(&device).await?;
        ensure_owner(Resource::Device(id), owner, principal)?;
        Ok(device)
    }

    /// Load a sensor on behalf of `principal`.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`] or
    /// [`SensorHubError::PermissionDenied`].
    pub async fn owned_sensor(
        &self,
        id: SensorId,
        principal: &Principal,
    ) -> Result<Sensor, SensorHubError> {
        let sensor = self.sensor(id).await?;
        let owner = self.sensor_owner(&sensor).await?;
        ensure_owner(Resource::Sensor(id), owner, principal)?;
        Ok(sensor)
    }

    /// Load a reading on behalf of `principal`.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`] or
    /// [`SensorHubError::PermissionDenied`].
    pub async fn owned_reading(
        &self,
        id: ReadingId,
        principal: &Principal,
    ) -> Result<Reading, SensorHubError> {
        let reading = self.reading(id).await?;
        let owner = self.reading_owner(&reading).await?;
        ensure_owner(Resource::Reading(id), owner, principal)?;
        Ok(reading)
    }

    async fn hub(&self, id: HubId) -> Result<Hub, SensorHubError> {
        self.store
            .hubs
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(EntityKind::Hub, id.to_string()))
    }

    async fn device(&self, id: DeviceId) -> Result<Device, SensorHubError> {
        self.store
            .devices
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(EntityKind::Device, id.to_string()))
    }

    async fn sensor(&self, id: SensorId) -> Result<Sensor, SensorHubError> {
        self.store
            .sensors
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(EntityKind::Sensor, id.to_string()))
    }

    async fn reading(&self, id: ReadingId) -> Result<Reading, SensorHubError> {
        self.store
            .readings
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(EntityKind::Reading, id.to_string()))
    }

    async fn hub_owner(&self, hub_serial_number: &str) -> Result<UserId, SensorHubError> {
        self.store
            .hubs
            .get_by_serial_number(hub_serial_number)
            .await?
            .map(|hub| hub.owner)
            .ok_or_else(|| not_found(EntityKind::Hub, hub_serial_number.to_owned()))
    }

    async fn device_owner(&self, device: &Device) -> Result<UserId, SensorHubError> {
        self.hub_owner(&device.hub).await
    }

    async fn sensor_owner(&self, sensor: &Sensor) -> Result<UserId, SensorHubError> {
        let device = self
            .store
            .devices
            .get_by_serial_number(&sensor.device)
            .await?
            .ok_or_else(|| not_found(EntityKind::Device, sensor.device.clone()))?;
        self.device_owner(&device).await
    }

    async fn reading_owner(&self, reading: &Reading) -> Result<UserId, SensorHubError> {
        let sensor = self
            .store
            .sensors
            .get_by_serial_number(&reading.sensor)
            .await?
            .ok_or_else(|| not_found(EntityKind::Sensor, reading.sensor.clone()))?;
        self.sensor_owner(&sensor).await
    }
}

fn not_found(entity: EntityKind, id: String) -> SensorHubError {
    NotFoundError { entity, id }.into()
}

fn ensure_owner(
    resource: Resource,
    owner: UserId,
    principal: &Principal,
) -> Result<(), SensorHubError> {
    if principal.owns(owner) {
        return Ok(());
    }
    tracing::warn!(
        user_id = %principal.user_id,
        entity = %resource.kind(),
        id = %resource.id(),
        "access denied to resource owned by another user"
    );
    Err(PermissionDeniedError::NotOwner {
        entity: resource.kind(),
        id: resource.id(),
    }
    .into())
}
