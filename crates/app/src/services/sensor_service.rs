//! Sensor service: use-cases for managing sensors.

use sensorhub_domain::error::{Constraint, SensorHubError, ValidationError};
use sensorhub_domain::id::SensorId;
use sensorhub_domain::kind::EntityKind;
use sensorhub_domain::principal::Principal;
use sensorhub_domain::reading::Reading;
use sensorhub_domain::sensor::{NewSensor, Sensor, SensorChanges};
use sensorhub_domain::update::UpdateMode;

use crate::ports::{DeviceRepository, HubRepository, ReadingRepository, SensorRepository};
use crate::services::ownership::OwnershipResolver;
use crate::store::Store;

/// Application service for sensor operations.
pub struct SensorService<H, D, S, R> {
    store: Store<H, D, S, R>,
    ownership: OwnershipResolver<H, D, S, R>,
}

impl<H, D, S, R> SensorService<H, D, S, R>
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

    /// Register a sensor on the device named by `new_sensor.device`.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::Validation`] if invariants fail, the device
    /// does not exist, the serial number is taken, or the device already
    /// has a sensor of the same data type; or a storage error.
    #[tracing::instrument(skip(self, new_sensor), fields(serial_number = %new_sensor.serial_number, device = %new_sensor.device))]
    pub async fn create_sensor(&self, new_sensor: NewSensor) -> Result<Sensor, SensorHubError> {
        let sensor = new_sensor.into_sensor()?;
        let _guard = self.store.write_gate.enter().await;
        self.ensure_device_exists(&sensor.device).await?;
        self.ensure_serial_number_free(&sensor.serial_number).await?;
        self.ensure_data_type_free(&sensor).await?;
        let sensor = self.store.sensors.create(sensor).await?;
        tracing::info!(sensor_id = %sensor.id, data_type = %sensor.data_type, "sensor registered");
        Ok(sensor)
    }

    /// List the sensors on the principal's devices.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_owned_sensors(&self, principal: &Principal) -> Result<Vec<Sensor>, SensorHubError> {
        self.store.sensors.find_by_owner(principal.user_id).await
    }

    /// Look up one of the principal's sensors.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`] or [`SensorHubError::PermissionDenied`].
    #[tracing::instrument(skip(self, principal))]
    pub async fn get_owned_sensor(&self, id: SensorId, principal: &Principal) -> Result<Sensor, SensorHubError> {
        self.ownership.owned_sensor(id, principal).await
    }

    /// Update one of the principal's sensors.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`], [`SensorHubError::PermissionDenied`],
    /// [`SensorHubError::Validation`], or a storage error.
    #[tracing::instrument(skip(self, changes, principal))]
    pub async fn update_owned_sensor(
        &self,
        id: SensorId,
        changes: SensorChanges,
        mode: UpdateMode,
        principal: &Principal,
    ) -> Result<Sensor, SensorHubError> {
        let _guard = self.store.write_gate.enter().await;
        let current = self.ownership.owned_sensor(id, principal).await?;
        let updated = current.clone().apply(changes, mode)?;
        if updated.device != current.device {
            self.ensure_device_exists(&updated.device).await?;
        }
        if updated.serial_number != current.serial_number {
            self.ensure_serial_number_free(&updated.serial_number).await?;
        }
        if updated.device != current.device || updated.data_type != current.data_type {
            self.ensure_data_type_free(&updated).await?;
        }
        self.store.sensors.update(updated).await
    }

    /// Delete one of the principal's sensors with its readings.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`], [`SensorHubError::PermissionDenied`],
    /// or a storage error.
    #[tracing::instrument(skip(self, principal))]
    pub async fn delete_owned_sensor(&self, id: SensorId, principal: &Principal) -> Result<(), SensorHubError> {
        let _guard = self.store.write_gate.enter().await;
        self.ownership.owned_sensor(id, principal).await?;
        self.store.sensors.delete(id).await?;
        tracing::info!("sensor deleted");
        Ok(())
    }

    /// List the readings of one of the principal's sensors, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`], [`SensorHubError::PermissionDenied`],
    /// or a storage error.
    pub async fn list_sensor_readings(
        &self,
        id: SensorId,
        principal: &Principal,
    ) -> Result<Vec<Reading>, SensorHubError> {
        let sensor = self.ownership.owned_sensor(id, principal).await?;
        self.store.readings.find_by_sensor(&sensor.serial_number).await
    }

    async fn ensure_device_exists(&self, device: &str) -> Result<(), SensorHubError> {
        if self.store.devices.get_by_serial_number(device).await?.is_none() {
            return Err(ValidationError::RelatedNotFound {
                entity: EntityKind::Device,
                serial_number: device.to_owned(),
            }
            .into());
        }
        Ok(())
    }

    async fn ensure_serial_number_free(&self, serial_number: &str) -> Result<(), SensorHubError> {
        if self
            .store
            .sensors
            .get_by_serial_number(serial_number)
            .await?
            .is_some()
        {
            return Err(ValidationError::ConstraintViolated(Constraint::SensorSerialNumber).into());
        }
        Ok(())
    }

    async fn ensure_data_type_free(&self, sensor: &Sensor) -> Result<(), SensorHubError> {
        let taken = self
            .store
            .sensors
            .find_by_device(&sensor.device)
            .await?
            .iter()
            .any(|other| other.id != sensor.id && other.data_type == sensor.data_type);
        if taken {
            return Err(ValidationError::ConstraintViolated(Constraint::SensorDataTypePerDevice).into());
        }
        Ok(())
    }
}
