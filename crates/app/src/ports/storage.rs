//! Storage port: repository traits for the registry hierarchy.
//!
//! Natural keys (serial numbers) link the levels: a device names its hub by
//! serial number, a sensor names its device, and a reading names its sensor.
//! Implementations must:
//! - persist each write atomically (a batch of readings is one transaction);
//! - cascade deletes to every descendant;
//! - return lists of readings ordered by `date_time_collected` ascending.

use std::future::Future;

use sensorhub_domain::device::Device;
use sensorhub_domain::error::SensorHubError;
use sensorhub_domain::hub::Hub;
use sensorhub_domain::id::{DeviceId, HubId, ReadingId, SensorId, UserId};
use sensorhub_domain::reading::{Reading, ValidatedReading};
use sensorhub_domain::sensor::Sensor;
use sensorhub_domain::time::{TimeRange, Timestamp};

/// Repository for [`Hub`]s.
pub trait HubRepository {
    /// Create a new hub in storage.
    fn create(&self, hub: Hub) -> impl Future<Output = Result<Hub, SensorHubError>> + Send;

    /// Get a hub by its unique identifier.
    fn get_by_id(&self, id: HubId) -> impl Future<Output = Result<Option<Hub>, SensorHubError>> + Send;

    /// Get a hub by its serial number.
    fn get_by_serial_number(
        &self,
        serial_number: &str,
    ) -> impl Future<Output = Result<Option<Hub>, SensorHubError>> + Send;

    /// Get the hubs owned by `owner`.
    fn find_by_owner(&self, owner: UserId) -> impl Future<Output = Result<Vec<Hub>, SensorHubError>> + Send;

    /// Update an existing hub. A changed serial number carries its devices along.
    fn update(&self, hub: Hub) -> impl Future<Output = Result<Hub, SensorHubError>> + Send;

    /// Delete a hub and everything beneath it.
    fn delete(&self, id: HubId) -> impl Future<Output = Result<(), SensorHubError>> + Send;
}

/// Repository for [`Device`]s.
pub trait DeviceRepository {
    /// Create a new device in storage.
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, SensorHubError>> + Send;

    /// Get a device by its unique identifier.
    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, SensorHubError>> + Send;

    /// Get a device by its serial number.
    fn get_by_serial_number(
        &self,
        serial_number: &str,
    ) -> impl Future<Output = Result<Option<Device>, SensorHubError>> + Send;

    /// Get the devices attached to the hub with serial number `hub`.
    fn find_by_hub(&self, hub: &str) -> impl Future<Output = Result<Vec<Device>, SensorHubError>> + Send;

    /// Get the devices whose hub is owned by `owner`.
    fn find_by_owner(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<Device>, SensorHubError>> + Send;

    /// Update an existing device. A changed serial number carries its sensors along.
    fn update(&self, device: Device) -> impl Future<Output = Result<Device, SensorHubError>> + Send;

    /// Delete a device, its sensors, and their readings.
    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), SensorHubError>> + Send;
}

/// Repository for [`Sensor`]s.
pub trait SensorRepository {
    /// Create a new sensor in storage.
    fn create(&self, sensor: Sensor) -> impl Future<Output = Result<Sensor, SensorHubError>> + Send;

    /// Get a sensor by its unique identifier.
    fn get_by_id(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<Sensor>, SensorHubError>> + Send;

    /// Get a sensor by its serial number.
    fn get_by_serial_number(
        &self,
        serial_number: &str,
    ) -> impl Future<Output = Result<Option<Sensor>, SensorHubError>> + Send;

    /// Get the sensors mounted on the device with serial number `device`.
    fn find_by_device(
        &self,
        device: &str,
    ) -> impl Future<Output = Result<Vec<Sensor>, SensorHubError>> + Send;

    /// Get the sensors whose device's hub is owned by `owner`.
    fn find_by_owner(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<Sensor>, SensorHubError>> + Send;

    /// Update an existing sensor. A changed serial number carries its readings along.
    fn update(&self, sensor: Sensor) -> impl Future<Output = Result<Sensor, SensorHubError>> + Send;

    /// Delete a sensor and its readings.
    fn delete(&self, id: SensorId) -> impl Future<Output = Result<(), SensorHubError>> + Send;
}

/// Append-only repository for [`Reading`]s.
pub trait ReadingRepository {
    /// Persist every reading of the batch, or none of them.
    fn create_batch(
        &self,
        readings: Vec<ValidatedReading>,
    ) -> impl Future<Output = Result<Vec<Reading>, SensorHubError>> + Send;

    /// Get a reading by its unique identifier.
    fn get_by_id(
        &self,
        id: ReadingId,
    ) -> impl Future<Output = Result<Option<Reading>, SensorHubError>> + Send;

    /// Get the reading collected at exactly `at`, if any.
    fn get_by_timestamp(
        &self,
        at: Timestamp,
    ) -> impl Future<Output = Result<Option<Reading>, SensorHubError>> + Send;

    /// Get every reading in the system.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Reading>, SensorHubError>> + Send;

    /// Get the readings of the sensor with serial number `sensor`.
    fn find_by_sensor(
        &self,
        sensor: &str,
    ) -> impl Future<Output = Result<Vec<Reading>, SensorHubError>> + Send;

    /// Get the readings whose sensor's device's hub is owned by `owner`.
    fn find_by_owner(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<Reading>, SensorHubError>> + Send;

    /// Get the readings of every sensor on the device with serial number
    /// `device` collected within `range`, both bounds included.
    fn find_by_device_in_range(
        &self,
        device: &str,
        range: TimeRange,
    ) -> impl Future<Output = Result<Vec<Reading>, SensorHubError>> + Send;
}
