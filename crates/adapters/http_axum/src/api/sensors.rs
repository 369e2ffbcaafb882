//! JSON REST handlers for sensors.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use sensorhub_app::ports::{DeviceRepository, HubRepository, ReadingRepository, SensorRepository};
use sensorhub_domain::error::ValidationError;
use sensorhub_domain::id::SensorId;
use sensorhub_domain::sensor::{NewSensor, Sensor, SensorChanges, SensorDataType};
use sensorhub_domain::update::UpdateMode;

use super::parse_id;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for registering a sensor on an existing device.
///
/// `data_type` stays a string here so an unknown value is reported as a
/// domain validation error rather than a decoding failure.
#[derive(Deserialize)]
pub struct CreateSensorRequest {
    pub title: String,
    pub serial_number: String,
    /// Serial number of the parent device.
    pub device: String,
    pub data_type: Option<String>,
}

impl TryFrom<CreateSensorRequest> for NewSensor {
    type Error = ValidationError;

    fn try_from(req: CreateSensorRequest) -> Result<Self, Self::Error> {
        let data_type = req
            .data_type
            .ok_or(ValidationError::UnknownDataType { given: None })?
            .parse::<SensorDataType>()?;
        Ok(Self {
            title: req.title,
            serial_number: req.serial_number,
            device: req.device,
            data_type,
        })
    }
}

/// Request body for `PUT` and `PATCH`.
#[derive(Deserialize)]
pub struct UpdateSensorRequest {
    pub title: Option<String>,
    pub serial_number: Option<String>,
    pub device: Option<String>,
    pub data_type: Option<String>,
}

impl TryFrom<UpdateSensorRequest> for SensorChanges {
    type Error = ValidationError;

    fn try_from(req: UpdateSensorRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: req.title,
            serial_number: req.serial_number,
            device: req.device,
            data_type: req
                .data_type
                .map(|raw| raw.parse::<SensorDataType>())
                .transpose()?,
        })
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Sensor>>),
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
    Ok(Json<Sensor>),
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
    Created(Json<Sensor>),
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

/// `GET /api/sensors`
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
    let sensors = state.sensor_service.list_owned_sensors(&principal).await?;
    Ok(ListResponse::Ok(Json(sensors)))
}

/// `GET /api/sensors/:id`
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
    let sensor_id: SensorId = parse_id(&id)?;
    let sensor = state
        .sensor_service
        .get_owned_sensor(sensor_id, &principal)
        .await?;
    Ok(GetResponse::Ok(Json(sensor)))
}

/// `POST /api/sensors`
pub async fn create<H, D, S, R>(
    Caller(_principal): Caller,
    State(state): State<AppState<H, D, S, R>>,
    payload: Result<Json<CreateSensorRequest>, JsonRejection>,
) -> Result<CreateResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let created = state.sensor_service.create_sensor(req.try_into()?).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/sensors/:id`
pub async fn replace<H, D, S, R>(
    caller: Caller,
    state: State<AppState<H, D, S, R>>,
    id: Path<String>,
    payload: Result<Json<UpdateSensorRequest>, JsonRejection>,
) -> Result<GetResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    apply(caller, state, id, payload, UpdateMode::Full).await
}

/// `PATCH /api/sensors/:id`
pub async fn update<H, D, S, R>(
    caller: Caller,
    state: State<AppState<H, D, S, R>>,
    id: Path<String>,
    payload: Result<Json<UpdateSensorRequest>, JsonRejection>,
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
    payload: Result<Json<UpdateSensorRequest>, JsonRejection>,
    mode: UpdateMode,
) -> Result<GetResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let sensor_id: SensorId = parse_id(&id)?;
    let Json(req) = payload?;
    let sensor = state
        .sensor_service
        .update_owned_sensor(sensor_id, req.try_into()?, mode, &principal)
        .await?;
    Ok(GetResponse::Ok(Json(sensor)))
}

/// `DELETE /api/sensors/:id`
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
    let sensor_id: SensorId = parse_id(&id)?;
    state
        .sensor_service
        .delete_owned_sensor(sensor_id, &principal)
        .await?;
    Ok(DeleteResponse::NoContent)
}

/// `GET /api/sensors/:id/readings`
pub async fn readings<H, D, S, R>(
    Caller(principal): Caller,
    State(state): State<AppState<H, D, S, R>>,
    Path(id): Path<String>,
) -> Result<super::readings::ListResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let sensor_id: SensorId = parse_id(&id)?;
    let readings = state
        .sensor_service
        .list_sensor_readings(sensor_id, &principal)
        .await?;
    Ok(super::readings::ListResponse::Ok(Json(readings)))
}
