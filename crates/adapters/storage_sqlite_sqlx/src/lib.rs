//! # sensorhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `sensorhub-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows, and translate constraint
//!   violations into domain validation errors
//!
//! ## Dependency rule
//! Depends on `sensorhub-app` (for port traits) and `sensorhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod columns;
mod device_repo;
mod error;
mod hub_repo;
mod pool;
mod reading_repo;
mod sensor_repo;

pub use device_repo::SqliteDeviceRepository;
pub use error::StorageError;
pub use hub_repo::SqliteHubRepository;
pub use pool::{Config, Database, SqliteStore};
pub use reading_repo::SqliteReadingRepository;
pub use sensor_repo::SqliteSensorRepository;
