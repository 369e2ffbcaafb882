//! Shared application state for axum handlers.

use std::sync::Arc;

use sensorhub_app::ports::{DeviceRepository, HubRepository, ReadingRepository, SensorRepository};
use sensorhub_app::services::device_service::DeviceService;
use sensorhub_app::services::hub_service::HubService;
use sensorhub_app::services::reading_service::ReadingService;
use sensorhub_app::services::sensor_service::SensorService;
use sensorhub_app::store::Store;

/// Application state shared across all axum handlers.
///
/// Generic over the four repository types to avoid dynamic dispatch.
/// `Clone` is implemented manually so the repositories themselves do not
/// need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<H, D, S, R> {
    /// Hub registration and management.
    pub hub_service: Arc<HubService<H, D, S, R>>,
    /// Device registration and management.
    pub device_service: Arc<DeviceService<H, D, S, R>>,
    /// Sensor registration and management.
    pub sensor_service: Arc<SensorService<H, D, S, R>>,
    /// Reading ingestion and queries.
    pub reading_service: Arc<ReadingService<H, D, S, R>>,
}

impl<H, D, S, R> Clone for AppState<H, D, S, R> {
    fn clone(&self) -> Self {
        Self {
            hub_service: Arc::clone(&self.hub_service),
            device_service: Arc::clone(&self.device_service),
            sensor_service: Arc::clone(&self.sensor_service),
            reading_service: Arc::clone(&self.reading_service),
        }
    }
}

impl<H, D, S, R> AppState<H, D, S, R>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    /// Build every service over the same store, so they share one write gate.
    pub fn new(store: Store<H, D, S, R>) -> Self {
        Self {
            hub_service: Arc::new(HubService::new(store.clone())),
            device_service: Arc::new(DeviceService::new(store.clone())),
            sensor_service: Arc::new(SensorService::new(store.clone())),
            reading_service: Arc::new(ReadingService::new(store)),
        }
    }
}
