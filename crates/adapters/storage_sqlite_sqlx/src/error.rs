//! Storage-specific error type wrapping sqlx errors.

use sensorhub_domain::error::{Constraint, SensorHubError, ValidationError};
use sensorhub_domain::kind::EntityKind;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for SensorHubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Unique indexes of the schema, by the column list `SQLite` reports.
const UNIQUE_COLUMNS: [(&str, Constraint); 5] = [
    ("hubs.serial_number", Constraint::HubSerialNumber),
    ("devices.serial_number", Constraint::DeviceSerialNumber),
    ("sensors.serial_number", Constraint::SensorSerialNumber),
    ("sensors.device, sensors.data_type", Constraint::SensorDataTypePerDevice),
    (
        "sensor_collected_data.date_time_collected",
        Constraint::ReadingTimestamp,
    ),
];

/// Translate a failed write into the domain error it stands for.
///
/// Unique and foreign key violations become validation errors; `parent`
/// names the row a foreign key violation points at. Anything else is a
/// storage failure.
pub(crate) fn write_error(err: sqlx::Error, parent: Option<(EntityKind, &str)>) -> SensorHubError {
    match as_validation(&err, parent) {
        Some(validation) => validation.into(),
        None => StorageError::from(err).into(),
    }
}

/// Like [`write_error`], but keeps the validation error unwrapped so batch
/// writes can attribute it to one item.
pub(crate) fn as_validation(
    err: &sqlx::Error,
    parent: Option<(EntityKind, &str)>,
) -> Option<ValidationError> {
    let sqlx::Error::Database(db) = err else {
        return None;
    };
    if db.is_unique_violation() {
        let message = db.message();
        return UNIQUE_COLUMNS
            .iter()
            .find(|(columns, _)| message.ends_with(*columns))
            .map(|(_, constraint)| ValidationError::ConstraintViolated(*constraint));
    }
    if db.is_foreign_key_violation() {
        return parent.map(|(entity, serial_number)| ValidationError::RelatedNotFound {
            entity,
            serial_number: serial_number.to_owned(),
        });
    }
    None
}
