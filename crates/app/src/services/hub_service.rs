//! Hub service: registration and owner-scoped management of hubs.

use sensorhub_domain::device::Device;
use sensorhub_domain::error::{Constraint, SensorHubError, ValidationError};
use sensorhub_domain::hub::{Hub, HubChanges, NewHub};
use sensorhub_domain::id::HubId;
use sensorhub_domain::principal::Principal;
use sensorhub_domain::update::UpdateMode;

use crate::ports::{DeviceRepository, HubRepository, ReadingRepository, SensorRepository};
use crate::services::ownership::OwnershipResolver;
use crate::store::Store;

/// Application service for hub operations.
pub struct HubService<H, D, S, R> {
    store: Store<H, D, S, R>,
    ownership: OwnershipResolver<H, D, S, R>,
}

impl<H, D, S, R> HubService<H, D, S, R>
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

    /// Register a hub owned by `principal`.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::Validation`] if invariants fail or the
    /// serial number is taken, or a storage error.
    #[tracing::instrument(skip(self, new_hub, principal), fields(serial_number = %new_hub.serial_number, user_id = %principal.user_id))]
    pub async fn create_hub(&self, new_hub: NewHub, principal: &Principal) -> Result<Hub, SensorHubError> {
        let hub = new_hub.into_hub(principal.user_id)?;
        let _guard = self.store.write_gate.enter().await;
        self.ensure_serial_number_free(&hub.serial_number).await?;
        let hub = self.store.hubs.create(hub).await?;
        tracing::info!(hub_id = %hub.id, "hub registered");
        Ok(hub)
    }

    /// List the hubs owned by `principal`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_owned_hubs(&self, principal: &Principal) -> Result<Vec<Hub>, SensorHubError> {
        self.store.hubs.find_by_owner(principal.user_id).await
    }

    /// Look up one of the principal's hubs.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`] when no hub with `id` exists,
    /// [`SensorHubError::PermissionDenied`] when another user owns it.
    #[tracing::instrument(skip(self, principal))]
    pub async fn get_owned_hub(&self, id: HubId, principal: &Principal) -> Result<Hub, SensorHubError> {
        self.ownership.owned_hub(id, principal).await
    }

    /// Update one of the principal's hubs.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`], [`SensorHubError::PermissionDenied`],
    /// [`SensorHubError::Validation`] for invalid changes or a taken serial
    /// number, or a storage error.
    #[tracing::instrument(skip(self, changes, principal))]
    pub async fn update_owned_hub(
        &self,
        id: HubId,
        changes: HubChanges,
        mode: UpdateMode,
        principal: &Principal,
    ) -> Result<Hub, SensorHubError> {
        let _guard = self.store.write_gate.enter().await;
        let current = self.ownership.owned_hub(id, principal).await?;
        let updated = current.clone().apply(changes, mode)?;
        if updated.serial_number != current.serial_number {
            self.ensure_serial_number_free(&updated.serial_number).await?;
        }
        self.store.hubs.update(updated).await
    }

    /// Delete one of the principal's hubs together with its devices,
    /// sensors, and readings.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`], [`SensorHubError::PermissionDenied`],
    /// or a storage error.
    #[tracing::instrument(skip(self, principal))]
    pub async fn delete_owned_hub(&self, id: HubId, principal: &Principal) -> Result<(), SensorHubError> {
        let _guard = self.store.write_gate.enter().await;
        self.ownership.owned_hub(id, principal).await?;
        self.store.hubs.delete(id).await?;
        tracing::info!("hub deleted");
        Ok(())
    }

    /// List the devices attached to one of the principal's hubs.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`], [`SensorHubError::PermissionDenied`],
    /// or a storage error.
    pub async fn list_hub_devices(
        &self,
        id: HubId,
        principal: &Principal,
    ) -> Result<Vec<Device>, SensorHubError> {
        let hub = self.ownership.owned_hub(id, principal).await?;
        self.store.devices.find_by_hub(&hub.serial_number).await
    }

    async fn ensure_serial_number_free(&self, serial_number: &str) -> Result<(), SensorHubError> {
        if self
            .store
            .hubs
            .get_by_serial_number(serial_number)
            .await?
            .is_some()
        {
            return Err(ValidationError::ConstraintViolated(Constraint::HubSerialNumber).into());
        }
        Ok(())
    }
}
