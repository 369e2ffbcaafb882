//! `SQLite` implementation of [`SensorRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use sensorhub_app::ports::SensorRepository;
use sensorhub_domain::error::SensorHubError;
use sensorhub_domain::id::{SensorId, UserId};
use sensorhub_domain::kind::EntityKind;
use sensorhub_domain::sensor::{Sensor, SensorDataType};

use crate::columns::decode_error;
use crate::error::{StorageError, write_error};

/// Wrapper for converting database rows into domain [`Sensor`].
struct Wrapper(Sensor);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Sensor> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let title: String = row.try_get("title")?;
        let serial_number: String = row.try_get("serial_number")?;
        let device: String = row.try_get("device")?;
        let data_type: String = row.try_get("data_type")?;

        Ok(Self(Sensor {
            id: SensorId::from_uuid(id),
            title,
            serial_number,
            device,
            data_type: SensorDataType::from_str(&data_type).map_err(decode_error)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO sensors (id, title, serial_number, device, data_type)
    VALUES (?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM sensors WHERE id = ?";
const SELECT_BY_SERIAL_NUMBER: &str = "SELECT * FROM sensors WHERE serial_number = ?";
const SELECT_BY_DEVICE: &str = "SELECT * FROM sensors WHERE device = ? ORDER BY rowid";
const SELECT_BY_OWNER: &str = r"
    SELECT s.* FROM sensors s
    JOIN devices d ON d.serial_number = s.device
    JOIN hubs h ON h.serial_number = d.hub
    WHERE h.owner = ?
    ORDER BY s.rowid
";
const UPDATE: &str = r"
    UPDATE sensors
    SET title = ?, serial_number = ?, device = ?, data_type = ?
    WHERE id = ?
";
const DELETE_BY_ID: &str = "DELETE FROM sensors WHERE id = ?";

/// `SQLite`-backed sensor repository.
pub struct SqliteSensorRepository {
    pool: SqlitePool,
}

impl SqliteSensorRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SensorRepository for SqliteSensorRepository {
    async fn create(&self, sensor: Sensor) -> Result<Sensor, SensorHubError> {
        sqlx::query(INSERT)
            .bind(sensor.id.as_uuid())
            .bind(&sensor.title)
            .bind(&sensor.serial_number)
            .bind(&sensor.device)
            .bind(sensor.data_type.as_str())
            .execute(&self.pool)
            .await
            .map_err(|err| write_error(err, Some((EntityKind::Device, &sensor.device))))?;

        Ok(sensor)
    }

    async fn get_by_id(&self, id: SensorId) -> Result<Option<Sensor>, SensorHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn get_by_serial_number(&self, serial_number: &str) -> Result<Option<Sensor>, SensorHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_SERIAL_NUMBER)
            .bind(serial_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn find_by_device(&self, device: &str) -> Result<Vec<Sensor>, SensorHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_DEVICE)
            .bind(device)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Sensor>, SensorHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_OWNER)
            .bind(owner.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, sensor: Sensor) -> Result<Sensor, SensorHubError> {
        sqlx::query(UPDATE)
            .bind(&sensor.title)
            .bind(&sensor.serial_number)
            .bind(&sensor.device)
            .bind(sensor.data_type.as_str())
            .bind(sensor.id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|err| write_error(err, Some((EntityKind::Device, &sensor.device))))?;

        Ok(sensor)
    }

    async fn delete(&self, id: SensorId) -> Result<(), SensorHubError> {
        sqlx::query(DELETE_BY_ID)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }
}
