//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use sensorhub_app::ports::{DeviceRepository, HubRepository, ReadingRepository, SensorRepository};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests the API routes under `/api` next to a `/health` probe.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<H, D, S, R>(state: AppState<H, D, S, R>) -> Router
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
