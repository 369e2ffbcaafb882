//! In-memory repositories shared by the service tests.
//!
//! One [`InMemoryStore`] implements all four repository traits over a single
//! set of tables, mirroring the relational backend: uniqueness and parent
//! references are checked, deletes cascade, and serial number renames carry
//! children along.

use std::future::Future;
use std::sync::{Arc, Mutex};

use sensorhub_domain::device::Device;
use sensorhub_domain::error::{Constraint, SensorHubError, ValidationError};
use sensorhub_domain::hub::Hub;
use sensorhub_domain::id::{DeviceId, HubId, ReadingId, SensorId, UserId};
use sensorhub_domain::kind::EntityKind;
use sensorhub_domain::principal::Principal;
use sensorhub_domain::reading::{Reading, ValidatedReading};
use sensorhub_domain::sensor::{Sensor, SensorDataType};
use sensorhub_domain::time::{TimeRange, Timestamp, parse_timestamp};

use crate::ports::{DeviceRepository, HubRepository, ReadingRepository, SensorRepository};
use crate::store::Store;

pub type MemStore = Store<InMemoryStore, InMemoryStore, InMemoryStore, InMemoryStore>;

#[derive(Default)]
pub struct Tables {
    pub hubs: Vec<Hub>,
    pub devices: Vec<Device>,
    pub sensors: Vec<Sensor>,
    pub readings: Vec<Reading>,
}

impl Tables {
    fn hub_serials_of(&self, owner: UserId) -> Vec<String> {
        self.hubs
            .iter()
            .filter(|hub| hub.owner == owner)
            .map(|hub| hub.serial_number.clone())
            .collect()
    }

    fn device_serials_of(&self, owner: UserId) -> Vec<String> {
        let hubs = self.hub_serials_of(owner);
        self.devices
            .iter()
            .filter(|device| hubs.contains(&device.hub))
            .map(|device| device.serial_number.clone())
            .collect()
    }

    fn sensor_serials_of(&self, owner: UserId) -> Vec<String> {
        let devices = self.device_serials_of(owner);
        self.sensors
            .iter()
            .filter(|sensor| devices.contains(&sensor.device))
            .map(|sensor| sensor.serial_number.clone())
            .collect()
    }

    fn delete_sensor(&mut self, serial_number: &str) {
        self.readings.retain(|reading| reading.sensor != serial_number);
        self.sensors.retain(|sensor| sensor.serial_number != serial_number);
    }

    fn delete_device(&mut self, serial_number: &str) {
        let sensors: Vec<String> = self
            .sensors
            .iter()
            .filter(|sensor| sensor.device == serial_number)
            .map(|sensor| sensor.serial_number.clone())
            .collect();
        for sensor in &sensors {
            self.delete_sensor(sensor);
        }
        self.devices.retain(|device| device.serial_number != serial_number);
    }

    fn delete_hub(&mut self, serial_number: &str) {
        let devices: Vec<String> = self
            .devices
            .iter()
            .filter(|device| device.hub == serial_number)
            .map(|device| device.serial_number.clone())
            .collect();
        for device in &devices {
            self.delete_device(device);
        }
        self.hubs.retain(|hub| hub.serial_number != serial_number);
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    pub tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn store(&self) -> MemStore {
        Store::new(self.clone(), self.clone(), self.clone(), self.clone())
    }

    pub fn reading_count(&self) -> usize {
        self.tables.lock().unwrap().readings.len()
    }
}

fn constraint(constraint: Constraint) -> SensorHubError {
    ValidationError::ConstraintViolated(constraint).into()
}

fn related(entity: EntityKind, serial_number: &str) -> SensorHubError {
    ValidationError::RelatedNotFound {
        entity,
        serial_number: serial_number.to_owned(),
    }
    .into()
}

fn sorted(mut readings: Vec<Reading>) -> Vec<Reading> {
    readings.sort_by_key(|reading| reading.date_time_collected);
    readings
}

impl HubRepository for InMemoryStore {
    fn create(&self, hub: Hub) -> impl Future<Output = Result<Hub, SensorHubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let result = if tables.hubs.iter().any(|h| h.serial_number == hub.serial_number) {
            Err(constraint(Constraint::HubSerialNumber))
        } else {
            tables.hubs.push(hub.clone());
            Ok(hub)
        };
        async { result }
    }

    fn get_by_id(&self, id: HubId) -> impl Future<Output = Result<Option<Hub>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result = tables.hubs.iter().find(|hub| hub.id == id).cloned();
        async move { Ok(result) }
    }

    fn get_by_serial_number(
        &self,
        serial_number: &str,
    ) -> impl Future<Output = Result<Option<Hub>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result = tables
            .hubs
            .iter()
            .find(|hub| hub.serial_number == serial_number)
            .cloned();
        async move { Ok(result) }
    }

    fn find_by_owner(&self, owner: UserId) -> impl Future<Output = Result<Vec<Hub>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result: Vec<Hub> = tables
            .hubs
            .iter()
            .filter(|hub| hub.owner == owner)
            .cloned()
            .collect();
        async move { Ok(result) }
    }

    fn update(&self, hub: Hub) -> impl Future<Output = Result<Hub, SensorHubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let old = tables
            .hubs
            .iter()
            .find(|h| h.id == hub.id)
            .map(|h| h.serial_number.clone());
        if let Some(old) = old {
            for device in tables.devices.iter_mut().filter(|d| d.hub == old) {
                device.hub.clone_from(&hub.serial_number);
            }
            for h in tables.hubs.iter_mut().filter(|h| h.id == hub.id) {
                *h = hub.clone();
            }
        }
        async { Ok(hub) }
    }

    fn delete(&self, id: HubId) -> impl Future<Output = Result<(), SensorHubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let serial = tables
            .hubs
            .iter()
            .find(|hub| hub.id == id)
            .map(|hub| hub.serial_number.clone());
        if let Some(serial) = serial {
            tables.delete_hub(&serial);
        }
        async { Ok(()) }
    }
}

impl DeviceRepository for InMemoryStore {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, SensorHubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let result = if !tables.hubs.iter().any(|h| h.serial_number == device.hub) {
            Err(related(EntityKind::Hub, &device.hub))
        } else if tables
            .devices
            .iter()
            .any(|d| d.serial_number == device.serial_number)
        {
            Err(constraint(Constraint::DeviceSerialNumber))
        } else {
            tables.devices.push(device.clone());
            Ok(device)
        };
        async { result }
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result = tables.devices.iter().find(|device| device.id == id).cloned();
        async move { Ok(result) }
    }

    fn get_by_serial_number(
        &self,
        serial_number: &str,
    ) -> impl Future<Output = Result<Option<Device>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result = tables
            .devices
            .iter()
            .find(|device| device.serial_number == serial_number)
            .cloned();
        async move { Ok(result) }
    }

    fn find_by_hub(&self, hub: &str) -> impl Future<Output = Result<Vec<Device>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result: Vec<Device> = tables
            .devices
            .iter()
            .filter(|device| device.hub == hub)
            .cloned()
            .collect();
        async move { Ok(result) }
    }

    fn find_by_owner(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<Device>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let hubs = tables.hub_serials_of(owner);
        let result: Vec<Device> = tables
            .devices
            .iter()
            .filter(|device| hubs.contains(&device.hub))
            .cloned()
            .collect();
        async move { Ok(result) }
    }

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, SensorHubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let old = tables
            .devices
            .iter()
            .find(|d| d.id == device.id)
            .map(|d| d.serial_number.clone());
        if let Some(old) = old {
            for sensor in tables.sensors.iter_mut().filter(|s| s.device == old) {
                sensor.device.clone_from(&device.serial_number);
            }
            for d in tables.devices.iter_mut().filter(|d| d.id == device.id) {
                *d = device.clone();
            }
        }
        async { Ok(device) }
    }

    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), SensorHubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let serial = tables
            .devices
            .iter()
            .find(|device| device.id == id)
            .map(|device| device.serial_number.clone());
        if let Some(serial) = serial {
            tables.delete_device(&serial);
        }
        async { Ok(()) }
    }
}

impl SensorRepository for InMemoryStore {
    fn create(&self, sensor: Sensor) -> impl Future<Output = Result<Sensor, SensorHubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let result = if !tables.devices.iter().any(|d| d.serial_number == sensor.device) {
            Err(related(EntityKind::Device, &sensor.device))
        } else if tables
            .sensors
            .iter()
            .any(|s| s.serial_number == sensor.serial_number)
        {
            Err(constraint(Constraint::SensorSerialNumber))
        } else if tables
            .sensors
            .iter()
            .any(|s| s.device == sensor.device && s.data_type == sensor.data_type)
        {
            Err(constraint(Constraint::SensorDataTypePerDevice))
        } else {
            tables.sensors.push(sensor.clone());
            Ok(sensor)
        };
        async { result }
    }

    fn get_by_id(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<Sensor>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result = tables.sensors.iter().find(|sensor| sensor.id == id).cloned();
        async move { Ok(result) }
    }

    fn get_by_serial_number(
        &self,
        serial_number: &str,
    ) -> impl Future<Output = Result<Option<Sensor>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result = tables
            .sensors
            .iter()
            .find(|sensor| sensor.serial_number == serial_number)
            .cloned();
        async move { Ok(result) }
    }

    fn find_by_device(
        &self,
        device: &str,
    ) -> impl Future<Output = Result<Vec<Sensor>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result: Vec<Sensor> = tables
            .sensors
            .iter()
            .filter(|sensor| sensor.device == device)
            .cloned()
            .collect();
        async move { Ok(result) }
    }

    fn find_by_owner(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<Sensor>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let devices = tables.device_serials_of(owner);
        let result: Vec<Sensor> = tables
            .sensors
            .iter()
            .filter(|sensor| devices.contains(&sensor.device))
            .cloned()
            .collect();
        async move { Ok(result) }
    }

    fn update(&self, sensor: Sensor) -> impl Future<Output = Result<Sensor, SensorHubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let old = tables
            .sensors
            .iter()
            .find(|s| s.id == sensor.id)
            .map(|s| s.serial_number.clone());
        if let Some(old) = old {
            for reading in tables.readings.iter_mut().filter(|r| r.sensor == old) {
                reading.sensor.clone_from(&sensor.serial_number);
            }
            for s in tables.sensors.iter_mut().filter(|s| s.id == sensor.id) {
                *s = sensor.clone();
            }
        }
        async { Ok(sensor) }
    }

    fn delete(&self, id: SensorId) -> impl Future<Output = Result<(), SensorHubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let serial = tables
            .sensors
            .iter()
            .find(|sensor| sensor.id == id)
            .map(|sensor| sensor.serial_number.clone());
        if let Some(serial) = serial {
            tables.delete_sensor(&serial);
        }
        async { Ok(()) }
    }
}

impl ReadingRepository for InMemoryStore {
    fn create_batch(
        &self,
        readings: Vec<ValidatedReading>,
    ) -> impl Future<Output = Result<Vec<Reading>, SensorHubError>> + Send {
        let mut tables = self.tables.lock().unwrap();
        let readings: Vec<Reading> = readings.into_iter().map(ValidatedReading::into_reading).collect();
        let clash = readings.iter().enumerate().any(|(i, reading)| {
            tables
                .readings
                .iter()
                .chain(&readings[..i])
                .any(|other| other.date_time_collected == reading.date_time_collected)
        });
        let result = if clash {
            Err(constraint(Constraint::ReadingTimestamp))
        } else {
            tables.readings.extend(readings.iter().cloned());
            Ok(readings)
        };
        async { result }
    }

    fn get_by_id(
        &self,
        id: ReadingId,
    ) -> impl Future<Output = Result<Option<Reading>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result = tables.readings.iter().find(|reading| reading.id == id).cloned();
        async move { Ok(result) }
    }

    fn get_by_timestamp(
        &self,
        at: Timestamp,
    ) -> impl Future<Output = Result<Option<Reading>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result = tables
            .readings
            .iter()
            .find(|reading| reading.date_time_collected == at)
            .cloned();
        async move { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Reading>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result = sorted(tables.readings.clone());
        async move { Ok(result) }
    }

    fn find_by_sensor(
        &self,
        sensor: &str,
    ) -> impl Future<Output = Result<Vec<Reading>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let result = sorted(
            tables
                .readings
                .iter()
                .filter(|reading| reading.sensor == sensor)
                .cloned()
                .collect(),
        );
        async move { Ok(result) }
    }

    fn find_by_owner(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<Reading>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let sensors = tables.sensor_serials_of(owner);
        let result = sorted(
            tables
                .readings
                .iter()
                .filter(|reading| sensors.contains(&reading.sensor))
                .cloned()
                .collect(),
        );
        async move { Ok(result) }
    }

    fn find_by_device_in_range(
        &self,
        device: &str,
        range: TimeRange,
    ) -> impl Future<Output = Result<Vec<Reading>, SensorHubError>> + Send {
        let tables = self.tables.lock().unwrap();
        let sensors: Vec<&str> = tables
            .sensors
            .iter()
            .filter(|sensor| sensor.device == device)
            .map(|sensor| sensor.serial_number.as_str())
            .collect();
        let result = sorted(
            tables
                .readings
                .iter()
                .filter(|reading| {
                    sensors.contains(&reading.sensor.as_str())
                        && range.contains(reading.date_time_collected)
                })
                .cloned()
                .collect(),
        );
        async move { Ok(result) }
    }
}

pub fn at(value: &str) -> Timestamp {
    parse_timestamp(value).unwrap()
}

/// U1 owns H1 ⊃ D1 ⊃ S1 (pH) with one reading; U2 owns nothing.
pub struct Fixture {
    pub memory: InMemoryStore,
    pub store: MemStore,
    pub owner: Principal,
    pub stranger: Principal,
    pub hub: Hub,
    pub device: Device,
    pub sensor: Sensor,
    pub reading: Reading,
}

impl Fixture {
    pub fn seeded() -> Self {
        let memory = InMemoryStore::default();
        let owner = Principal::user(UserId::new());
        let stranger = Principal::user(UserId::new());
        let hub = Hub::builder()
            .title("Greenhouse")
            .serial_number("H1")
            .owner(owner.user_id)
            .build()
            .unwrap();
        let device = Device::builder()
            .title("Controller")
            .serial_number("D1")
            .hub("H1")
            .build()
            .unwrap();
        let sensor = Sensor::builder()
            .title("Acidity")
            .serial_number("S1")
            .device("D1")
            .data_type(SensorDataType::Ph)
            .build()
            .unwrap();
        let reading = Reading {
            id: ReadingId::new(),
            date_time_collected: at("2019-02-07T08:10:22Z"),
            sensor: "S1".to_string(),
            value: 7.0,
        };
        {
            let mut tables = memory.tables.lock().unwrap();
            tables.hubs.push(hub.clone());
            tables.devices.push(device.clone());
            tables.sensors.push(sensor.clone());
            tables.readings.push(reading.clone());
        }
        Self {
            store: memory.store(),
            memory,
            owner,
            stranger,
            hub,
            device,
            sensor,
            reading,
        }
    }
}
