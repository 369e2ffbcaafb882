//! `SQLite` implementation of [`ReadingRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use sensorhub_app::ports::ReadingRepository;
use sensorhub_domain::error::{BatchItemError, SensorHubError, ValidationError};
use sensorhub_domain::id::{ReadingId, UserId};
use sensorhub_domain::kind::EntityKind;
use sensorhub_domain::reading::{Reading, ValidatedReading};
use sensorhub_domain::time::{TimeRange, Timestamp};

use crate::columns::{decode_timestamp, encode_timestamp};
use crate::error::{StorageError, as_validation};

/// Wrapper for converting database rows into domain [`Reading`].
struct Wrapper(Reading);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Reading> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let date_time_collected: String = row.try_get("date_time_collected")?;
        let sensor: String = row.try_get("sensor")?;
        let value: f64 = row.try_get("value")?;

        Ok(Self(Reading {
            id: ReadingId::from_uuid(id),
            date_time_collected: decode_timestamp(&date_time_collected)?,
            sensor,
            value,
        }))
    }
}

/// Inserts only while the sensor still has the type the value was checked against.
const INSERT: &str = r"
    INSERT INTO sensor_collected_data (id, date_time_collected, sensor, value)
    SELECT ?, ?, serial_number, ? FROM sensors
    WHERE serial_number = ? AND data_type = ?
";
const SELECT_BY_ID: &str = "SELECT * FROM sensor_collected_data WHERE id = ?";
const SELECT_BY_TIMESTAMP: &str = "SELECT * FROM sensor_collected_data WHERE date_time_collected = ?";
const SELECT_ALL: &str = "SELECT * FROM sensor_collected_data ORDER BY date_time_collected ASC";
const SELECT_BY_SENSOR: &str = r"
    SELECT * FROM sensor_collected_data
    WHERE sensor = ?
    ORDER BY date_time_collected ASC
";
const SELECT_BY_OWNER: &str = r"
    SELECT r.* FROM sensor_collected_data r
    JOIN sensors s ON s.serial_number = r.sensor
    JOIN devices d ON d.serial_number = s.device
    JOIN hubs h ON h.serial_number = d.hub
    WHERE h.owner = ?
    ORDER BY r.date_time_collected ASC
";
const SELECT_BY_DEVICE_IN_RANGE: &str = r"
    SELECT r.* FROM sensor_collected_data r
    JOIN sensors s ON s.serial_number = r.sensor
    WHERE s.device = ? AND r.date_time_collected >= ? AND r.date_time_collected <= ?
    ORDER BY r.date_time_collected ASC
";

/// `SQLite`-backed reading repository.
pub struct SqliteReadingRepository {
    pool: SqlitePool,
}

impl SqliteReadingRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn rejected(index: usize, error: ValidationError) -> SensorHubError {
    ValidationError::Batch(vec![BatchItemError { index, error }]).into()
}

impl ReadingRepository for SqliteReadingRepository {
    async fn create_batch(&self, readings: Vec<ValidatedReading>) -> Result<Vec<Reading>, SensorHubError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        for (index, validated) in readings.iter().enumerate() {
            let reading = validated.reading();
            let result = sqlx::query(INSERT)
                .bind(reading.id.as_uuid())
                .bind(encode_timestamp(reading.date_time_collected))
                .bind(reading.value)
                .bind(&reading.sensor)
                .bind(validated.data_type().as_str())
                .execute(&mut *tx)
                .await;
            match result {
                Ok(done) if done.rows_affected() == 0 => {
                    return Err(rejected(
                        index,
                        ValidationError::RelatedNotFound {
                            entity: EntityKind::Sensor,
                            serial_number: reading.sensor.clone(),
                        },
                    ));
                }
                Ok(_) => {}
                Err(err) => {
                    return Err(match as_validation(&err, Some((EntityKind::Sensor, &reading.sensor))) {
                        Some(error) => rejected(index, error),
                        None => StorageError::from(err).into(),
                    });
                }
            }
        }

        tx.commit().await.map_err(StorageError::from)?;

        Ok(readings.into_iter().map(ValidatedReading::into_reading).collect())
    }

    async fn get_by_id(&self, id: ReadingId) -> Result<Option<Reading>, SensorHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn get_by_timestamp(&self, at: Timestamp) -> Result<Option<Reading>, SensorHubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_TIMESTAMP)
            .bind(encode_timestamp(at))
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<Reading>, SensorHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn find_by_sensor(&self, sensor: &str) -> Result<Vec<Reading>, SensorHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_SENSOR)
            .bind(sensor)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Reading>, SensorHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_OWNER)
            .bind(owner.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn find_by_device_in_range(
        &self,
        device: &str,
        range: TimeRange,
    ) -> Result<Vec<Reading>, SensorHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_DEVICE_IN_RANGE)
            .bind(device)
            .bind(encode_timestamp(range.start))
            .bind(encode_timestamp(range.end))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
