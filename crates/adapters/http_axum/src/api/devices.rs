//! JSON REST handlers for devices.

use std::time::Duration;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use sensorhub_app::ports::{DeviceRepository, HubRepository, ReadingRepository, SensorRepository};
use sensorhub_domain::device::{Device, DeviceChanges, NewDevice};
use sensorhub_domain::id::DeviceId;
use sensorhub_domain::time::duration_secs;
use sensorhub_domain::update::UpdateMode;

use super::parse_id;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for registering a device under an existing hub.
#[derive(Deserialize)]
pub struct CreateDeviceRequest {
    pub title: String,
    pub serial_number: String,
    /// Serial number of the parent hub.
    pub hub: String,
    #[serde(default, with = "duration_secs::option")]
    pub sensors_data_fetch_time: Option<Duration>,
}

impl From<CreateDeviceRequest> for NewDevice {
    fn from(req: CreateDeviceRequest) -> Self {
        Self {
            title: req.title,
            serial_number: req.serial_number,
            hub: req.hub,
            sensors_data_fetch_time: req.sensors_data_fetch_time,
        }
    }
}

/// Request body for `PUT` and `PATCH`.
#[derive(Deserialize)]
pub struct UpdateDeviceRequest {
    pub title: Option<String>,
    pub serial_number: Option<String>,
    pub hub: Option<String>,
    #[serde(default, with = "duration_secs::option")]
    pub sensors_data_fetch_time: Option<Duration>,
}

impl From<UpdateDeviceRequest> for DeviceChanges {
    fn from(req: UpdateDeviceRequest) -> Self {
        Self {
            title: req.title,
            serial_number: req.serial_number,
            hub: req.hub,
            sensors_data_fetch_time: req.sensors_data_fetch_time,
        }
    }
}

/// Query string of the time-range endpoint.
#[derive(Deserialize)]
pub struct RangeQuery {
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Device>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<Device>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Device>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/devices`
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
    let devices = state.device_service.list_owned_devices(&principal).await?;
    Ok(ListResponse::Ok(Json(devices)))
}

/// `GET /api/devices/:id`
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
    let device_id: DeviceId = parse_id(&id)?;
    let device = state
        .device_service
        .get_owned_device(device_id, &principal)
        .await?;
    Ok(GetResponse::Ok(Json(device)))
}

/// `POST /api/devices`
///
/// Any authenticated caller may register a device on any existing hub.
pub async fn create<H, D, S, R>(
    Caller(_principal): Caller,
    State(state): State<AppState<H, D, S, R>>,
    payload: Result<Json<CreateDeviceRequest>, JsonRejection>,
) -> Result<CreateResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let created = state.device_service.create_device(req.into()).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/devices/:id`
pub async fn replace<H, D, S, R>(
    caller: Caller,
    state: State<AppState<H, D, S, R>>,
    id: Path<String>,
    payload: Result<Json<UpdateDeviceRequest>, JsonRejection>,
) -> Result<GetResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    apply(caller, state, id, payload, UpdateMode::Full).await
}

/// `PATCH /api/devices/:id`
pub async fn update<H, D, S, R>(
    caller: Caller,
    state: State<AppState<H, D, S, R>>,
    id: Path<String>,
    payload: Result<Json<UpdateDeviceRequest>, JsonRejection>,
) -> Result<GetResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    apply(caller, state, id, payload, UpdateMode::Partial).await
}

async fn apply<H, D, S, R>(
    Caller(principal): Caller,
    State(state): State<AppState<H, D, S, R>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateDeviceRequest>, JsonRejection>,
    mode: UpdateMode,
) -> Result<GetResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let device_id: DeviceId = parse_id(&id)?;
    let Json(req) = payload?;
    let device = state
        .device_service
        .update_owned_device(device_id, req.into(), mode, &principal)
        .await?;
    Ok(GetResponse::Ok(Json(device)))
}

/// `DELETE /api/devices/:id`
pub async fn delete<H, D, S, R>(
    Caller(principal): Caller,
    State(state): State<AppState<H, D, S, R>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let device_id: DeviceId = parse_id(&id)?;
    state
        .device_service
        .delete_owned_device(device_id, &principal)
        .await?;
    Ok(DeleteResponse::NoContent)
}

/// `GET /api/devices/:id/sensors`
pub async fn sensors<H, D, S, R>(
    Caller(principal): Caller,
    State(state): State<AppState<H, D, S, R>>,
    Path(id): Path<String>,
) -> Result<super::sensors::ListResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let device_id: DeviceId = parse_id(&id)?;
    let sensors = state
        .device_service
        .list_device_sensors(device_id, &principal)
        .await?;
    Ok(super::sensors::ListResponse::Ok(Json(sensors)))
}

/// `GET /api/devices/:id/readings?start_datetime=..&end_datetime=..`
///
/// Both bounds are required and inclusive.
pub async fn readings<H, D, S, R>(
    Caller(principal): Caller,
    State(state): State<AppState<H, D, S, R>>,
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<super::readings::ListResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let device_id: DeviceId = parse_id(&id)?;
    let readings = state
        .reading_service
        .query_range(
            device_id,
            query.start_datetime.as_deref(),
            query.end_datetime.as_deref(),
            &principal,
        )
        .await?;
    Ok(super::readings::ListResponse::Ok(Json(readings)))
}
