//! `SQLite` implementation of [`HubRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use sensorhub_app::ports::HubRepository;
use sensorhub_domain::error::SensorHubError;
use sensorhub_domain::hub::Hub;
use sensorhub_domain::id::{HubId, UserId};

use crate::columns::{decode_duration, encode_duration};
use crate::error::{StorageError, write_error};

/// Wrapper for converting database rows into domain [`Hub`].
struct Wrapper(Hub);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Hub> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let title: String = row.try_get("title")?;
        let serial_number: String = row.try_get("serial_number")?;
        let owner: uuid::Uuid = row.try_get("owner")?;
        let devices_data_fetch_time: i64 = row.try_get("devices_data_fetch_time")?;
        let hub_data_update_time: i64 = row.try_get("hub_data_update_time")?;

        Ok(Self(Hub {
            id: HubId::from_uuid(id),
            title,
            serial_number,
            owner: UserId::from_uuid(owner),
            devices_data_fetch_time: decode_duration(devices_data_fetch_time)?,
            hub_data_update_time: decode_duration(hub_data_update_time)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO hubs (id, title, serial_number, owner, devices_data_fetch_time, hub_data_update_time)
    VALUES (?, ?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM hubs WHERE id = ?";
const SELECT_BY_SERIAL_NUMBER: &str = "SELECT * FROM hubs WHERE serial_number = ?";
const SELECT_BY_OWNER: &str = "SELECT * FROM hubs WHERE owner = ? ORDER BY rowid";
const UPDATE: &str = r"
    UPDATE hubs
    SET title = ?, serial_number = ?, devices_data_fetch_time = ?, hub_data_update_time = ?
    WHERE id = ?
";
const DELETE_BY_ID: &str = "DELETE FROM hubs WHERE id = ?";

/// `SQLite`-backed hub repository.
pub struct SqliteHubRepository {
    pool: SqlitePool,
}

impl SqliteHubRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl HubRepository for SqliteHubRepository {
    async fn create(&self, hub: Hub) -> Result<Hub, SensorHubError> {
        sqlx::query(INSERT)
            .bind(hub.id.as_uuid())
            .bind(&hub.title)
            .bind(&hub.serial_number)
            .bind(hub.owner.as_uuid())
            .bind(encode_duration(hub.devices_data_fetch_time).map_err(StorageError::from)?)
            .bind(encode_duration(hub.hub_data_update_time).map_err(StorageError::from)?)
            .execute(&self.pool)
            .await
            .map_err(|err| write_error(err, None))?;

        Ok(hub)
    }

    async fn get_by_id(&self, id: HubId) -> Result<Option<Hub>, SensorHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn get_by_serial_number(&self, serial_number: &str) -> Result<Option<Hub>, SensorHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_SERIAL_NUMBER)
            .bind(serial_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Hub>, SensorHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_OWNER)
            .bind(owner.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, hub: Hub) -> Result<Hub, SensorHubError> {
        sqlx::query(UPDATE)
            .bind(&hub.title)
            .bind(&hub.serial_number)
            .bind(encode_duration(hub.devices_data_fetch_time).map_err(StorageError::from)?)
            .bind(encode_duration(hub.hub_data_update_time).map_err(StorageError::from)?)
            .bind(hub.id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|err| write_error(err, None))?;

        Ok(hub)
    }

    async fn delete(&self, id: HubId) -> Result<(), SensorHubError> {
        sqlx::query(DELETE_BY_ID)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }
}
