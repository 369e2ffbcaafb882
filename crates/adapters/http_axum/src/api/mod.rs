//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod hubs;
#[allow(clippy::missing_errors_doc)]
pub mod readings;
#[allow(clippy::missing_errors_doc)]
pub mod sensors;

use std::str::FromStr;

use axum::Router;
use axum::routing::get;

use sensorhub_app::ports::{DeviceRepository, HubRepository, ReadingRepository, SensorRepository};
use sensorhub_domain::error::ValidationError;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<H, D, S, R>() -> Router<AppState<H, D, S, R>>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    Router::new()
        // Hubs
        .route(
            "/hubs",
            get(hubs::list::<H, D, S, R>).post(hubs::create::<H, D, S, R>),
        )
        .route(
            "/hubs/{id}",
            get(hubs::get::<H, D, S, R>)
                .put(hubs::replace::<H, D, S, R>)
                .patch(hubs::update::<H, D, S, R>)
                .delete(hubs::delete::<H, D, S, R>),
        )
        .route("/hubs/{id}/devices", get(hubs::devices::<H, D, S, R>))
        // Devices
        .route(
            "/devices",
            get(devices::list::<H, D, S, R>).post(devices::create::<H, D, S, R>),
        )
        .route(
            "/devices/{id}",
            get(devices::get::<H, D, S, R>)
                .put(devices::replace::<H, D, S, R>)
                .patch(devices::update::<H, D, S, R>)
                .delete(devices::delete::<H, D, S, R>),
        )
        .route("/devices/{id}/sensors", get(devices::sensors::<H, D, S, R>))
        .route("/devices/{id}/readings", get(devices::readings::<H, D, S, R>))
        // Sensors
        .route(
            "/sensors",
            get(sensors::list::<H, D, S, R>).post(sensors::create::<H, D, S, R>),
        )
        .route(
            "/sensors/{id}",
            get(sensors::get::<H, D, S, R>)
                .put(sensors::replace::<H, D, S, R>)
                .patch(sensors::update::<H, D, S, R>)
                .delete(sensors::delete::<H, D, S, R>),
        )
        .route("/sensors/{id}/readings", get(sensors::readings::<H, D, S, R>))
        // Readings
        .route(
            "/readings",
            get(readings::list::<H, D, S, R>).post(readings::create::<H, D, S, R>),
        )
        .route("/readings/all", get(readings::list_all::<H, D, S, R>))
        .route("/readings/{id}", get(readings::get::<H, D, S, R>))
}

/// Parse a path identifier, reporting a malformed one as a validation error.
fn parse_id<T: FromStr>(raw: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::from(ValidationError::InvalidId(raw.to_owned())))
}
