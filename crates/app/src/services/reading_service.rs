//! Reading service: batch ingestion and scoped queries over readings.
//!
//! Ingestion is all-or-nothing: every item of a batch is validated against
//! its sensor's data type, and the batch is persisted only when none fails.

use std::collections::{HashMap, HashSet};

use sensorhub_domain::error::{
    BatchItemError, Constraint, PermissionDeniedError, SensorHubError, ValidationError,
};
use sensorhub_domain::id::{DeviceId, ReadingId};
use sensorhub_domain::kind::EntityKind;
use sensorhub_domain::principal::Principal;
use sensorhub_domain::reading::{NewReading, Reading, ValidatedReading};
use sensorhub_domain::sensor::SensorDataType;
use sensorhub_domain::time::{TimeRange, Timestamp};

use crate::ports::{DeviceRepository, HubRepository, ReadingRepository, SensorRepository};
use crate::services::ownership::OwnershipResolver;
use crate::store::Store;

/// Application service for reading operations.
pub struct ReadingService<H, D, S, R> {
    store: Store<H, D, S, R>,
    ownership: OwnershipResolver<H, D, S, R>,
}

impl<H, D, S, R> ReadingService<H, D, S, R>
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

    /// Validate and persist a batch of readings.
    ///
    /// Items the caller already failed to decode arrive as `Err` and are
    /// reported at their index alongside the service's own rejections.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Batch`] listing every failing item (decode
    /// failure, unknown sensor, out-of-range value, taken or repeated
    /// timestamp); nothing is persisted in that case. Storage failures
    /// propagate as-is.
    #[tracing::instrument(skip(self, items), fields(size = items.len()))]
    pub async fn create_batch(
        &self,
        items: Vec<Result<NewReading, ValidationError>>,
    ) -> Result<Vec<Reading>, SensorHubError> {
        let _guard = self.store.write_gate.enter().await;

        let mut data_types: HashMap<String, Option<SensorDataType>> = HashMap::new();
        let mut seen: HashSet<Timestamp> = HashSet::new();
        let mut accepted = Vec::with_capacity(items.len());
        let mut rejected = Vec::new();

        for (index, item) in items.into_iter().enumerate() {
            let item = match item {
                Ok(item) => item,
                Err(error) => {
                    rejected.push(BatchItemError { index, error });
                    continue;
                }
            };
            let cached = data_types.get(&item.sensor).copied();
            let data_type = match cached {
                Some(data_type) => data_type,
                None => {
                    let data_type = self
                        .store
                        .sensors
                        .get_by_serial_number(&item.sensor)
                        .await?
                        .map(|sensor| sensor.data_type);
                    data_types.insert(item.sensor.clone(), data_type);
                    data_type
                }
            };
            match self.check(item, data_type, &mut seen).await? {
                Ok(reading) => accepted.push(reading),
                Err(error) => rejected.push(BatchItemError { index, error }),
            }
        }

        if !rejected.is_empty() {
            tracing::warn!(rejected = rejected.len(), "reading batch rejected");
            return Err(ValidationError::Batch(rejected).into());
        }

        let readings = self.store.readings.create_batch(accepted).await?;
        tracing::info!(count = readings.len(), "readings stored");
        Ok(readings)
    }

    /// List the readings of the principal's sensors, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_owned_readings(&self, principal: &Principal) -> Result<Vec<Reading>, SensorHubError> {
        self.store.readings.find_by_owner(principal.user_id).await
    }

    /// List every reading in the system. Administrators only.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::PermissionDenied`] for a non-administrator,
    /// or a storage error.
    #[tracing::instrument(skip(self, principal), fields(user_id = %principal.user_id))]
    pub async fn list_all_readings(&self, principal: &Principal) -> Result<Vec<Reading>, SensorHubError> {
        if !principal.is_admin() {
            tracing::warn!("non-administrator asked for every reading");
            return Err(PermissionDeniedError::AdminOnly {
                action: "listing every reading",
            }
            .into());
        }
        self.store.readings.get_all().await
    }

    /// Look up one of the principal's readings.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`] or [`SensorHubError::PermissionDenied`].
    #[tracing::instrument(skip(self, principal))]
    pub async fn get_owned_reading(&self, id: ReadingId, principal: &Principal) -> Result<Reading, SensorHubError> {
        self.ownership.owned_reading(id, principal).await
    }

    /// Readings of every sensor on one of the principal's devices collected
    /// between the raw `start` and `end` bounds, both included, oldest first.
    ///
    /// The device is resolved before the bounds are parsed, so an unknown or
    /// foreign device wins over malformed bounds. A range whose start lies
    /// after its end yields no readings.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`], [`SensorHubError::PermissionDenied`],
    /// [`ValidationError::MissingField`] or [`ValidationError::InvalidTimestamp`]
    /// for a bad bound, or a storage error.
    #[tracing::instrument(skip(self, principal))]
    pub async fn query_range(
        &self,
        device_id: DeviceId,
        start: Option<&str>,
        end: Option<&str>,
        principal: &Principal,
    ) -> Result<Vec<Reading>, SensorHubError> {
        let device = self.ownership.owned_device(device_id, principal).await?;
        let range = TimeRange::parse(start, end)?;
        if range.start > range.end {
            return Ok(Vec::new());
        }
        self.store
            .readings
            .find_by_device_in_range(&device.serial_number, range)
            .await
    }

    /// Validate one batch item. The outer error is a storage failure; the
    /// inner one is the item's own rejection.
    async fn check(
        &self,
        item: NewReading,
        data_type: Option<SensorDataType>,
        seen: &mut HashSet<Timestamp>,
    ) -> Result<Result<ValidatedReading, ValidationError>, SensorHubError> {
        let Some(data_type) = data_type else {
            return Ok(Err(ValidationError::RelatedNotFound {
                entity: EntityKind::Sensor,
                serial_number: item.sensor,
            }));
        };
        let at = item.date_time_collected;
        let reading = match item.validate(data_type) {
            Ok(reading) => reading,
            Err(error) => return Ok(Err(error)),
        };
        if !seen.insert(at) || self.store.readings.get_by_timestamp(at).await?.is_some() {
            return Ok(Err(ValidationError::ConstraintViolated(Constraint::ReadingTimestamp)));
        }
        Ok(Ok(reading))
    }
}
