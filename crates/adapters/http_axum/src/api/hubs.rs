//! JSON REST handlers for hubs.

use std::time::Duration;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use sensorhub_app::ports::{DeviceRepository, HubRepository, ReadingRepository, SensorRepository};
use sensorhub_domain::hub::{Hub, HubChanges, NewHub};
use sensorhub_domain::id::HubId;
use sensorhub_domain::time::duration_secs;
use sensorhub_domain::update::UpdateMode;

use super::parse_id;
use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for registering a hub. The caller becomes its owner.
#[derive(Deserialize)]
pub struct CreateHubRequest {
    pub title: String,
    pub serial_number: String,
    #[serde(default, with = "duration_secs::option")]
    pub devices_data_fetch_time: Option<Duration>,
    #[serde(default, with = "duration_secs::option")]
    pub hub_data_update_time: Option<Duration>,
}

impl From<CreateHubRequest> for NewHub {
    fn from(req: CreateHubRequest) -> Self {
        Self {
            title: req.title,
            serial_number: req.serial_number,
            devices_data_fetch_time: req.devices_data_fetch_time,
            hub_data_update_time: req.hub_data_update_time,
        }
    }
}

/// Request body for `PUT` and `PATCH`.
#[derive(Deserialize)]
pub struct UpdateHubRequest {
    pub title: Option<String>,
    pub serial_number: Option<String>,
    #[serde(default, with = "duration_secs::option")]
    pub devices_data_fetch_time: Option<Duration>,
    #[serde(default, with = "duration_secs::option")]
    pub hub_data_update_time: Option<Duration>,
}

impl From<UpdateHubRequest> for HubChanges {
    fn from(req: UpdateHubRequest) -> Self {
        Self {
            title: req.title,
            serial_number: req.serial_number,
            devices_data_fetch_time: req.devices_data_fetch_time,
            hub_data_update_time: req.hub_data_update_time,
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Hub>>),
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
    Ok(Json<Hub>),
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
    Created(Json<Hub>),
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

/// `GET /api/hubs`
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
    let hubs = state.hub_service.list_owned_hubs(&principal).await?;
    Ok(ListResponse::Ok(Json(hubs)))
}

/// `GET /api/hubs/:id`
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
    let hub_id: HubId = parse_id(&id)?;
    let hub = state.hub_service.get_owned_hub(hub_id, &principal).await?;
    Ok(GetResponse::Ok(Json(hub)))
}

/// `POST /api/hubs`
pub async fn create<H, D, S, R>(
    Caller(principal): Caller,
    State(state): State<AppState<H, D, S, R>>,
    payload: Result<Json<CreateHubRequest>, JsonRejection>,
) -> Result<CreateResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let created = state.hub_service.create_hub(req.into(), &principal).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/hubs/:id`
pub async fn replace<H, D, S, R>(
    caller: Caller,
    state: State<AppState<H, D, S, R>>,
    id: Path<String>,
    payload: Result<Json<UpdateHubRequest>, JsonRejection>,
) -> Result<GetResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    apply(caller, state, id, payload, UpdateMode::Full).await
}

/// `PATCH /api/hubs/:id`
pub async fn update<H, D, S, R>(
    caller: Caller,
    state: State<AppState<H, D, S, R>>,
    id: Path<String>,
    payload: Result<Json<UpdateHubRequest>, JsonRejection>,
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
    payload: Result<Json<UpdateHubRequest>, JsonRejection>,
    mode: UpdateMode,
) -> Result<GetResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let hub_id: HubId = parse_id(&id)?;
    let Json(req) = payload?;
    let hub = state
        .hub_service
        .update_owned_hub(hub_id, req.into(), mode, &principal)
        .await?;
    Ok(GetResponse::Ok(Json(hub)))
}

/// `DELETE /api/hubs/:id`
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
    let hub_id: HubId = parse_id(&id)?;
    state.hub_service.delete_owned_hub(hub_id, &principal).await?;
    Ok(DeleteResponse::NoContent)
}

/// `GET /api/hubs/:id/devices`
pub async fn devices<H, D, S, R>(
    Caller(principal): Caller,
    State(state): State<AppState<H, D, S, R>>,
    Path(id): Path<String>,
) -> Result<super::devices::ListResponse, ApiError>
where
    H: HubRepository + Send + Sync + 'static,
    D: DeviceRepository + Send + Sync + 'static,
    S: SensorRepository + Send + Sync + 'static,
    R: ReadingRepository + Send + Sync + 'static,
{
    let hub_id: HubId = parse_id(&id)?;
    let devices = state.hub_service.list_hub_devices(hub_id, &principal).await?;
    Ok(super::devices::ListResponse::Ok(Json(devices)))
}
