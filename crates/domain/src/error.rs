//! Common error types used across the workspace.
//!
//! Every layer surfaces one of the [`SensorHubError`] kinds to its caller,
//! which maps it to a transport-level status. Adapters define their own typed
//! errors and convert into [`SensorHubError`] via `From`.

use std::fmt;

use crate::kind::EntityKind;
use crate::sensor::SensorDataType;

/// Top-level error for every core operation.
#[derive(Debug, thiserror::Error)]
pub enum SensorHubError {
    /// Malformed or out-of-range input.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The referenced entity does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The entity exists but the principal may not act on it.
    #[error(transparent)]
    PermissionDenied(#[from] PermissionDeniedError),

    /// The storage backend failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A uniqueness constraint enforced by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    HubSerialNumber,
    DeviceSerialNumber,
    SensorSerialNumber,
    /// A device carries at most one sensor of each data type.
    SensorDataTypePerDevice,
    /// Collection timestamps are unique across all readings.
    ReadingTimestamp,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::HubSerialNumber => "hub serial number already exists",
            Self::DeviceSerialNumber => "device serial number already exists",
            Self::SensorSerialNumber => "sensor serial number already exists",
            Self::SensorDataTypePerDevice => "device already has a sensor of this data type",
            Self::ReadingTimestamp => "a reading with this collection time already exists",
        })
    }
}

/// Input that violates a domain invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("title cannot be longer than {max} characters")]
    TitleTooLong { max: usize },

    #[error("serial number must not be empty")]
    EmptySerialNumber,

    #[error("serial number cannot be longer than {max} characters")]
    SerialNumberTooLong { max: usize },

    #[error("{field} cannot be longer than {max} seconds")]
    IntervalTooLong { field: &'static str, max: u64 },

    /// A full update omitted a required field.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("unknown sensor data type")]
    UnknownDataType { given: Option<String> },

    #[error("{data_type} value must be a finite number")]
    NonFiniteValue { data_type: SensorDataType },

    #[error("{data_type} value cannot be less than {min}")]
    ValueBelowMinimum {
        data_type: SensorDataType,
        value: f64,
        min: f64,
    },

    #[error("{data_type} value cannot be more than {max}")]
    ValueAboveMaximum {
        data_type: SensorDataType,
        value: f64,
        max: f64,
    },

    #[error("related entity not found: {entity} with serial number '{serial_number}'")]
    RelatedNotFound {
        entity: EntityKind,
        serial_number: String,
    },

    #[error("constraint violated: {0}")]
    ConstraintViolated(Constraint),

    #[error("invalid timestamp: '{0}'")]
    InvalidTimestamp(String),

    #[error("invalid identifier: '{0}'")]
    InvalidId(String),

    /// One or more items of an all-or-nothing batch failed.
    #[error("batch rejected: {} invalid item(s)", .0.len())]
    Batch(Vec<BatchItemError>),
}

/// Failure of a single item within a rejected batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("item {index}: {error}")]
pub struct BatchItemError {
    /// Zero-based position of the item in the submitted batch.
    pub index: usize,
    pub error: ValidationError,
}

/// The requested entity does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    pub entity: EntityKind,
    pub id: String,
}

/// The principal is authenticated but lacks rights over the target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionDeniedError {
    #[error("you are not allowed to perform this action on {entity} {id}")]
    NotOwner { entity: EntityKind, id: String },

    #[error("{action} requires an administrator")]
    AdminOnly { action: &'static str },
}
