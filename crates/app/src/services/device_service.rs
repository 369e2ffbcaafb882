//! Device service: use-cases for managing devices.

use sensorhub_domain::device::{Device, DeviceChanges, NewDevice};
use sensorhub_domain::error::{Constraint, SensorHubError, ValidationError};
use sensorhub_domain::id::DeviceId;
use sensorhub_domain::kind::EntityKind;
use sensorhub_domain::principal::Principal;
use sensorhub_domain::sensor::Sensor;
use sensorhub_domain::update::UpdateMode;

use crate::ports::{DeviceRepository, HubRepository, ReadingRepository, SensorRepository};
use crate::services::ownership::OwnershipResolver;
use crate::store::Store;

/// Application service for device operations.
pub struct DeviceService<H, D, S, R> {
    store: Store<H, D, S, R>,
    ownership: OwnershipResolver<H, D, S, R>,
}

impl<H, D, S, R> DeviceService<H, D, S, R>
where
    H: HubRepository,
    D: DeviceRepository,
    S: SensorRepository,
    R: ReadingRepository,
{
    /// Create a new service backed by the given store.
    pub fn new(store: Store<H, D, S, R>) -> Self {
        Self {
            ownership: OwnershipResolver::new(store.clone()),
            store,
        }
    }

    /// Register a device under the hub named by `new_device.hub`.
    ///
    /// Registration is not scoped to the hub's owner.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::Validation`] if invariants fail, the hub
    /// does not exist, or the serial number is taken, or a storage error.
    #[tracing::instrument(skip(self, new_device), fields(serial_number = %new_device.serial_number, hub = %new_device.hub))]
    pub async fn create_device(&self, new_device: NewDevice) -> Result<Device, SensorHubError> {
        let device = new_device.into_device()?;
        let _guard = self.store.write_gate.enter().await;
        self.ensure_hub_exists(&device.hub).await?;
        self.ensure_serial_number_free(&device.serial_number).await?;
        let device = self.store.devices.create(device).await?;
        tracing::info!(device_id = %device.id, "device registered");
        Ok(device)
    }

    /// List the devices on the principal's hubs.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_owned_devices(&self, principal: &Principal) -> Result<Vec<Device>, SensorHubError> {
        self.store.devices.find_by_owner(principal.user_id).await
    }

    /// Look up a device by id, returning an error if not found or foreign.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`] when no device with `id` exists,
    /// [`SensorHubError::PermissionDenied`] when another user owns it.
    #[tracing::instrument(skip(self, principal))]
    pub async fn get_owned_device(&self, id: DeviceId, principal: &Principal) -> Result<Device, SensorHubError> {
        self.ownership.owned_device(id, principal).await
    }

    /// Update one of the principal's devices.
    ///
    /// Moving a device to another hub only requires the target hub to exist.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`], [`SensorHubError::PermissionDenied`],
    /// [`SensorHubError::Validation`], or a storage error.
    #[tracing::instrument(skip(self, changes, principal))]
    pub async fn update_owned_device(
        &self,
        id: DeviceId,
        changes: DeviceChanges,
        mode: UpdateMode,
        principal: &Principal,
    ) -> Result<Device, SensorHubError> {
        let _guard = self.store.write_gate.enter().await;
        let current = self.ownership.owned_device(id, principal).await?;
        let updated = current.clone().apply(changes, mode)?;
        if updated.hub != current.hub {
            self.ensure_hub_exists(&updated.hub).await?;
        }
        if updated.serial_number != current.serial_number {
            self.ensure_serial_number_free(&updated.serial_number).await?;
        }
        self.store.devices.update(updated).await
    }

    /// Delete one of the principal's devices with its sensors and readings.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`], [`SensorHubError::PermissionDenied`],
    /// or a storage error.
    #[tracing::instrument(skip(self, principal))]
    pub async fn delete_owned_device(&self, id: DeviceId, principal: &Principal) -> Result<(), SensorHubError> {
        let _guard = self.store.write_gate.enter().await;
        self.ownership.owned_device(id, principal).await?;
        self.store.devices.delete(id).await?;
        tracing::info!("device deleted");
        Ok(())
    }

    /// List the sensors mounted on one of the principal's devices.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`], [`SensorHubError::PermissionDenied`],
    /// or a storage error.
    pub async fn list_device_sensors(
        &self,
        id: DeviceId,
        principal: &Principal,
    ) -> Result<Vec<Sensor>, SensorHubError> {
        let device = self.ownership.owned_device(id, principal).await?;
        self.store.sensors.find_by_device(&device.serial_number).await
    }

    async fn ensure_hub_exists(&self, hub: &str) -> Result<(), SensorHubError> {
        if self.store.hubs.get_by_serial_number(hub).await?.is_none() {
            return Err(ValidationError::RelatedNotFound {
                entity: EntityKind::Hub,
                serial_number: hub.to_owned(),
            }
            .into());
        }
        Ok(())
    }

    async fn ensure_serial_number_free(&self, serial_number: &str) -> Result<(), SensorHubError> {
        if self
            .store
            .devices
            .get_by_serial_number(serial_number)
            .await?
            .is_some()
        {
            return Err(ValidationError::ConstraintViolated(Constraint::DeviceSerialNumber).into());
        }
        Ok(())
    }
}
