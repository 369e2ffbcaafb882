//! `SQLite` implementation of [`DeviceRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use sensorhub_app::ports::DeviceRepository;
use sensorhub_domain::device::Device;
use sensorhub_domain::error::SensorHubError;
use sensorhub_domain::id::{DeviceId, UserId};
use sensorhub_domain::kind::EntityKind;

use crate::columns::{decode_duration, encode_duration};
use crate::error::{StorageError, write_error};

/// Wrapper for converting database rows into domain [`Device`].
struct Wrapper(Device);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Device> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let title: String = row.try_get("title")?;
        let serial_number: String = row.try_get("serial_number")?;
        let hub: String = row.try_get("hub")?;
        let sensors_data_fetch_time: i64 = row.try_get("sensors_data_fetch_time")?;

        Ok(Self(Device {
            id: DeviceId::from_uuid(id),
            title,
            serial_number,
            hub,
            sensors_data_fetch_time: decode_duration(sensors_data_fetch_time)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO devices (id, title, serial_number, hub, sensors_data_fetch_time)
    VALUES (?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM devices WHERE id = ?";
const SELECT_BY_SERIAL_NUMBER: &str = "SELECT * FROM devices WHERE serial_number = ?";
const SELECT_BY_HUB: &str = "SELECT * FROM devices WHERE hub = ? ORDER BY rowid";
const SELECT_BY_OWNER: &str = r"
    SELECT d.* FROM devices d
    JOIN hubs h ON h.serial_number = d.hub
    WHERE h.owner = ?
    ORDER BY d.rowid
";
const UPDATE: &str = r"
    UPDATE devices
    SET title = ?, serial_number = ?, hub = ?, sensors_data_fetch_time = ?
    WHERE id = ?
";
const DELETE_BY_ID: &str = "DELETE FROM devices WHERE id = ?";

/// `SQLite`-backed device repository.
pub struct SqliteDeviceRepository {
    pool: SqlitePool,
}

impl SqliteDeviceRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl DeviceRepository for SqliteDeviceRepository {
    async fn create(&self, device: Device) -> Result<Device, SensorHubError> {
        sqlx::query(INSERT)
            .bind(device.id.as_uuid())
            .bind(&device.title)
            .bind(&device.serial_number)
            .bind(&device.hub)
            .bind(encode_duration(device.sensors_data_fetch_time).map_err(StorageError::from)?)
            .execute(&self.pool)
            .await
            .map_err(|err| write_error(err, Some((EntityKind::Hub, &device.hub))))?;

        Ok(device)
    }

    async fn get_by_id(&self, id: DeviceId) -> Result<Option<Device>, SensorHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn get_by_serial_number(&self, serial_number: &str) -> Result<Option<Device>, SensorHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_SERIAL_NUMBER)
            .bind(serial_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn find_by_hub(&self, hub: &str) -> Result<Vec<Device>, SensorHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_HUB)
            .bind(hub)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Device>, SensorHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_OWNER)
            .bind(owner.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, device: Device) -> Result<Device, SensorHubError> {
        sqlx::query(UPDATE)
            .bind(&device.title)
            .bind(&device.serial_number)
            .bind(&device.hub)
            .bind(encode_duration(device.sensors_data_fetch_time).map_err(StorageError::from)?)
            .bind(device.id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|err| write_error(err, Some((EntityKind::Hub, &device.hub))))?;

        Ok(device)
    }

    async fn delete(&self, id: DeviceId) -> Result<(), SensorHubError> {
        sqlx::query(DELETE_BY_ID)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }
}
