//! `SQLite` connection pool setup and migration runner.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;

use sensorhub_app::store::Store;

use crate::device_repo::SqliteDeviceRepository;
use crate::error::StorageError;
use crate::hub_repo::SqliteHubRepository;
use crate::reading_repo::SqliteReadingRepository;
use crate::sensor_repo::SqliteSensorRepository;

/// The repository bundle backed by one `SQLite` database.
pub type SqliteStore = Store<
    SqliteHubRepository,
    SqliteDeviceRepository,
    SqliteSensorRepository,
    SqliteReadingRepository,
>;

/// Configuration for the `SQLite` storage adapter.
pub struct Config {
    /// `SQLite` connection URL (e.g. `sqlite:sensorhub.db` or `sqlite::memory:`).
    pub database_url: String,
}

impl Config {
    /// Build a [`Database`] from this configuration.
    ///
    /// Creates the connection pool, creates the database file if missing,
    /// and runs all pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the connection or migrations fail.
    pub async fn build(self) -> Result<Database, StorageError> {
        Database::initialize(&self.database_url).await
    }
}

/// Holds the `SQLite` connection pool and provides access to it.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database and run migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the connection or migrations fail.
    async fn initialize(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Borrow the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Bundle one repository per table over this database.
    #[must_use]
    pub fn store(&self) -> SqliteStore {
        Store::new(
            SqliteHubRepository::new(self.pool.clone()),
            SqliteDeviceRepository::new(self.pool.clone()),
            SqliteSensorRepository::new(self.pool.clone()),
            SqliteReadingRepository::new(self.pool.clone()),
        )
    }
}
