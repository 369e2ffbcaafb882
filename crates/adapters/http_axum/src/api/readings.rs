//! JSON REST handlers for readings.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use sensorhub_app::ports::{DeviceRepository, HubRepository, ReadingRepository, SensorRepository};
use sensorhub_domain::error::ValidationError;
use sensorhub_domain::id::ReadingId;
use sensorhub_domain::reading::{DEFAULT_VALUE, NewReading, Reading};
use sensorhub_domain::time::parse_timestamp;

use super::parse_id;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::AppState;

/// One item of a batch submission.
#[derive(Deserialize)]
pub struct CreateReadingRequest {
    pub date_time_collected: String,
    /// Serial number of the sensor that produced the value.
    pub sensor: String,
    pub value: Option<f64>,
}

impl TryFrom<CreateReadingRequest> for NewReading {
    type Error = ValidationError;

    fn try_from(req: CreateReadingRequest) -> Result<Self, Self::Error> {
        Ok(Self::new(
            parse_timestamp(&req.date_time_collected)?,
            req.sensor,
            req.value.unwrap_or(DEFAULT_VALUE),
        ))
    }
}

/// Possible responses from the list endpoints.
pub enum ListResponse {
    Ok(Json<Vec<Reading>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<Reading>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the batch create endpoint.
pub enum CreateResponse {
    Created(Json<Vec<Reading>>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `POST /api/readings`
///
/// Devices push their data here without a user identity. The whole batch
/// is rejected when any item is invalid.
pub async fn create<H, D, S, R>(
    State(state): State<AppState<H, D, S, R>>,
    payload: Result<Json<Vec<CreateReadingRequest>>, JsonRejection>,
) -> Result<CreateResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let Json(items) = payload?;
    let readings = items.into_iter().map(NewReading::try_from).collect();

    let created = state.reading_service.create_batch(readings).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `GET /api/readings`
pub async fn list<H, D, S, R>(
    Caller(principal): Caller,
    State(state): State<AppState<H, D, S, R>>,
) -> Result<ListResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let readings = state.reading_service.list_owned_readings(&principal).await?;
    Ok(ListResponse::Ok(Json(readings)))
}

/// `GET /api/readings/all`
pub async fn list_all<H, D, S, R>(
    Caller(principal): Caller,
    State(state): State<AppState<H, D, S, R>>,
) -> Result<ListResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let readings = state.reading_service.list_all_readings(&principal).await?;
    Ok(ListResponse::Ok(Json(readings)))
}

/// `GET /api/readings/:id`
pub async fn get<H, D, S, R>(
    Caller(principal): Caller,
    State(state): State<AppState<H, D, S, R>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let reading_id: ReadingId = parse_id(&id)?;
    let reading = state
        .reading_service
        .get_owned_reading(reading_id, &principal)
        .await?;
    Ok(GetResponse::Ok(Json(reading)))
}
