//! End-to-end tests for the full sensorhubd stack.
//!
//! Each test spins up the complete application (in-memory `SQLite`, real repos,
//! real services, real axum router) and exercises the HTTP layer via
//! `tower::ServiceExt::oneshot`; no TCP port is bound.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sensorhub_adapter_http_axum::router;
use sensorhub_adapter_http_axum::state::AppState;
use sensorhub_adapter_storage_sqlite_sqlx::Config;
use sensorhub_domain::id::{DeviceId, UserId};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Build a fully-wired router backed by an in-memory `SQLite` database.
async fn app() -> Router {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");

    router::build(AppState::new(db.store()))
}

/// Who sends a request.
#[derive(Clone, Copy)]
enum As {
    Anonymous,
    User(UserId),
    Admin(UserId),
}

async fn send(app: &Router, method: &str, uri: &str, who: As, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    match who {
        As::Anonymous => {}
        As::User(user_id) => request = request.header("x-user-id", user_id.to_string()),
        As::Admin(user_id) => {
            request = request
                .header("x-user-id", user_id.to_string())
                .header("x-user-role", "admin");
        }
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

struct Seeded {
    app: Router,
    owner: UserId,
    hub_id: String,
    device_id: String,
    sensor_id: String,
}

/// Register hub `H1`, device `D1`, and pH sensor `S1` as one user.
async fn seeded() -> Seeded {
    let app = app().await;
    let owner = UserId::new();

    let (status, hub) = send(
        &app,
        "POST",
        "/api/hubs",
        As::User(owner),
        Some(json!({"title": "Greenhouse", "serial_number": "H1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, device) = send(
        &app,
        "POST",
        "/api/devices",
        As::User(owner),
        Some(json!({"title": "Tank", "serial_number": "D1", "hub": "H1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, sensor) = send(
        &app,
        "POST",
        "/api/sensors",
        As::User(owner),
        Some(json!({"title": "Probe", "serial_number": "S1", "device": "D1", "data_type": "pH"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    Seeded {
        app,
        owner,
        hub_id: hub["id"].as_str().unwrap().to_string(),
        device_id: device["id"].as_str().unwrap().to_string(),
        sensor_id: sensor["id"].as_str().unwrap().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let app = app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_apply_default_intervals_when_registering_hierarchy() {
    let seeded = seeded().await;

    let (status, hub) = send(
        &seeded.app,
        "GET",
        &format!("/api/hubs/{}", seeded.hub_id),
        As::User(seeded.owner),
        None,
    )
    .await;
    let (_, device) = send(
        &seeded.app,
        "GET",
        &format!("/api/devices/{}", seeded.device_id),
        As::User(seeded.owner),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(hub["owner"], seeded.owner.to_string());
    assert_eq!(hub["devices_data_fetch_time"], 300);
    assert_eq!(hub["hub_data_update_time"], 600);
    assert_eq!(device["hub"], "H1");
    assert_eq!(device["sensors_data_fetch_time"], 5);
}

#[tokio::test]
async fn should_return_400_when_device_already_has_sensor_of_type() {
    let seeded = seeded().await;

    let (status, body) = send(
        &seeded.app,
        "POST",
        "/api/sensors",
        As::User(seeded.owner),
        Some(json!({"title": "Probe 2", "serial_number": "S2", "device": "D1", "data_type": "pH"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "constraint violated: device already has a sensor of this data type"
    );
}

#[tokio::test]
async fn should_return_400_when_sensor_serial_number_taken() {
    let seeded = seeded().await;

    let (status, body) = send(
        &seeded.app,
        "POST",
        "/api/sensors",
        As::User(seeded.owner),
        Some(json!({"title": "Thermo", "serial_number": "S1", "device": "D1", "data_type": "Temperature"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "constraint violated: sensor serial number already exists");
}

#[tokio::test]
async fn should_return_400_when_data_type_unknown() {
    let seeded = seeded().await;

    let (status, body) = send(
        &seeded.app,
        "POST",
        "/api/sensors",
        As::User(seeded.owner),
        Some(json!({"title": "Probe 2", "serial_number": "S2", "device": "D1", "data_type": "Humidity"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unknown sensor data type");
}

#[tokio::test]
async fn should_return_400_when_hub_serial_number_taken() {
    let seeded = seeded().await;

    let (status, _) = send(
        &seeded.app,
        "POST",
        "/api/hubs",
        As::User(UserId::new()),
        Some(json!({"title": "Other", "serial_number": "H1"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_reading_when_range_covers_collection_time() {
    let seeded = seeded().await;
    let (status, created) = send(
        &seeded.app,
        "POST",
        "/api/readings",
        As::Anonymous,
        Some(json!([{"date_time_collected": "2019-02-07T08:10:22Z", "sensor": "S1", "value": 7.0}])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.as_array().unwrap().len(), 1);

    let (status, readings) = send(
        &seeded.app,
        "GET",
        &format!(
            "/api/devices/{}/readings?start_datetime=2019-02-07T08:10:22Z&end_datetime=2019-02-07T08:10:22Z",
            seeded.device_id
        ),
        As::User(seeded.owner),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(readings.as_array().unwrap().len(), 1);
    assert_eq!(readings[0]["sensor"], "S1");
    assert_eq!(readings[0]["value"], 7.0);
}

#[tokio::test]
async fn should_store_default_value_when_value_omitted() {
    let seeded = seeded().await;

    let (status, created) = send(
        &seeded.app,
        "POST",
        "/api/readings",
        As::Anonymous,
        Some(json!([{"date_time_collected": "2019-02-07T08:10:22Z", "sensor": "S1"}])),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created[0]["value"], 0.1);
}

#[tokio::test]
async fn should_store_nothing_when_any_batch_item_out_of_range() {
    let seeded = seeded().await;

    let (status, body) = send(
        &seeded.app,
        "POST",
        "/api/readings",
        As::Anonymous,
        Some(json!([
            {"date_time_collected": "2019-02-07T08:10:22Z", "sensor": "S1", "value": 7.0},
            {"date_time_collected": "2019-02-07T08:10:23Z", "sensor": "S1", "value": 15.0}
        ])),
    )
    .await;
    let (_, all) = send(&seeded.app, "GET", "/api/readings/all", As::Admin(UserId::new()), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["index"], 1);
    assert_eq!(body["details"][0]["error"], "pH value cannot be more than 14");
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn should_list_unparseable_and_out_of_range_items_together() {
    let seeded = seeded().await;

    let (status, body) = send(
        &seeded.app,
        "POST",
        "/api/readings",
        As::Anonymous,
        Some(json!([
            {"date_time_collected": "bad", "sensor": "S1"},
            {"date_time_collected": "2019-02-07T08:10:22Z", "sensor": "S1", "value": 15.0}
        ])),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"],
        json!([
            {"index": 0, "error": "invalid timestamp: 'bad'"},
            {"index": 1, "error": "pH value cannot be more than 14"}
        ])
    );
}

#[tokio::test]
async fn should_return_400_when_timestamp_already_recorded() {
    let seeded = seeded().await;
    let batch = json!([{"date_time_collected": "2019-02-07T08:10:22Z", "sensor": "S1", "value": 7.0}]);
    send(&seeded.app, "POST", "/api/readings", As::Anonymous, Some(batch.clone())).await;

    let (status, body) = send(&seeded.app, "POST", "/api/readings", As::Anonymous, Some(batch)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["index"], 0);
}

#[tokio::test]
async fn should_show_every_reading_only_when_caller_is_admin() {
    let seeded = seeded().await;
    send(
        &seeded.app,
        "POST",
        "/api/readings",
        As::Anonymous,
        Some(json!([{"date_time_collected": "2019-02-07T08:10:22Z", "sensor": "S1", "value": 7.0}])),
    )
    .await;
    let stranger = UserId::new();

    let (admin_status, all) = send(&seeded.app, "GET", "/api/readings/all", As::Admin(stranger), None).await;
    let (user_status, _) = send(&seeded.app, "GET", "/api/readings/all", As::User(stranger), None).await;
    let (_, own) = send(&seeded.app, "GET", "/api/readings", As::User(stranger), None).await;
    let (_, admin_own) = send(&seeded.app, "GET", "/api/readings", As::Admin(stranger), None).await;

    assert_eq!(admin_status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(user_status, StatusCode::FORBIDDEN);
    assert_eq!(own, json!([]));
    assert_eq!(admin_own, json!([]));
}

#[tokio::test]
async fn should_list_sensor_readings_oldest_first() {
    let seeded = seeded().await;
    send(
        &seeded.app,
        "POST",
        "/api/readings",
        As::Anonymous,
        Some(json!([
            {"date_time_collected": "2019-02-07T08:10:24Z", "sensor": "S1", "value": 9.0},
            {"date_time_collected": "2019-02-07T08:10:22Z", "sensor": "S1", "value": 7.0}
        ])),
    )
    .await;

    let (status, readings) = send(
        &seeded.app,
        "GET",
        &format!("/api/sensors/{}/readings", seeded.sensor_id),
        As::User(seeded.owner),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(readings[0]["value"], 7.0);
    assert_eq!(readings[1]["value"], 9.0);
}

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_403_when_stranger_reads_existing_hub() {
    let seeded = seeded().await;
    let stranger = UserId::new();

    let (existing, _) = send(
        &seeded.app,
        "GET",
        &format!("/api/hubs/{}", seeded.hub_id),
        As::User(stranger),
        None,
    )
    .await;
    let (missing, _) = send(
        &seeded.app,
        "GET",
        &format!("/api/hubs/{}", UserId::new()),
        As::User(stranger),
        None,
    )
    .await;

    assert_eq!(existing, StatusCode::FORBIDDEN);
    assert_eq!(missing, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_return_403_when_stranger_queries_device_range() {
    let seeded = seeded().await;

    let (status, _) = send(
        &seeded.app,
        "GET",
        &format!(
            "/api/devices/{}/readings?start_datetime=2019-01-01T00:00:00Z&end_datetime=2020-01-01T00:00:00Z",
            seeded.device_id
        ),
        As::User(UserId::new()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_return_404_for_unknown_device_even_with_malformed_bounds() {
    let seeded = seeded().await;

    let (status, _) = send(
        &seeded.app,
        "GET",
        &format!("/api/devices/{}/readings?start_datetime=bad", DeviceId::new()),
        As::User(seeded.owner),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_return_400_when_range_bound_missing_on_owned_device() {
    let seeded = seeded().await;

    let (status, body) = send(
        &seeded.app,
        "GET",
        &format!(
            "/api/devices/{}/readings?start_datetime=2019-02-07T08:10:22Z",
            seeded.device_id
        ),
        As::User(seeded.owner),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing required field: end_datetime");
}

#[tokio::test]
async fn should_return_401_when_identity_missing() {
    let seeded = seeded().await;

    let (status, _) = send(&seeded.app, "GET", "/api/hubs", As::Anonymous, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Updates and deletes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_400_when_put_omits_required_field() {
    let seeded = seeded().await;

    let (status, body) = send(
        &seeded.app,
        "PUT",
        &format!("/api/hubs/{}", seeded.hub_id),
        As::User(seeded.owner),
        Some(json!({"title": "Renamed"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing required field: serial_number");
}

#[tokio::test]
async fn should_return_400_when_interval_exceeds_storage_range() {
    let seeded = seeded().await;
    let uri = format!("/api/hubs/{}", seeded.hub_id);

    let (status, body) = send(
        &seeded.app,
        "PATCH",
        &uri,
        As::User(seeded.owner),
        Some(json!({"devices_data_fetch_time": u64::MAX})),
    )
    .await;
    let (_, hub) = send(&seeded.app, "GET", &uri, As::User(seeded.owner), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "devices_data_fetch_time cannot be longer than 9223372036854775807 seconds"
    );
    assert_eq!(hub["devices_data_fetch_time"], 300);
}

#[tokio::test]
async fn should_keep_children_attached_when_hub_serial_patched() {
    let seeded = seeded().await;

    let (status, hub) = send(
        &seeded.app,
        "PATCH",
        &format!("/api/hubs/{}", seeded.hub_id),
        As::User(seeded.owner),
        Some(json!({"serial_number": "H1-B"})),
    )
    .await;
    let (_, devices) = send(
        &seeded.app,
        "GET",
        &format!("/api/hubs/{}/devices", seeded.hub_id),
        As::User(seeded.owner),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(hub["title"], "Greenhouse");
    assert_eq!(devices[0]["hub"], "H1-B");
}

#[tokio::test]
async fn should_remove_descendants_when_hub_deleted() {
    let seeded = seeded().await;
    send(
        &seeded.app,
        "POST",
        "/api/readings",
        As::Anonymous,
        Some(json!([{"date_time_collected": "2019-02-07T08:10:22Z", "sensor": "S1", "value": 7.0}])),
    )
    .await;

    let (status, _) = send(
        &seeded.app,
        "DELETE",
        &format!("/api/hubs/{}", seeded.hub_id),
        As::User(seeded.owner),
        None,
    )
    .await;
    let (_, sensors) = send(&seeded.app, "GET", "/api/sensors", As::User(seeded.owner), None).await;
    let (_, all) = send(&seeded.app, "GET", "/api/readings/all", As::Admin(UserId::new()), None).await;
    let (device_status, _) = send(
        &seeded.app,
        "GET",
        &format!("/api/devices/{}", seeded.device_id),
        As::User(seeded.owner),
        None,
    )
    .await;
    let (sensor_status, _) = send(
        &seeded.app,
        "GET",
        &format!("/api/sensors/{}", seeded.sensor_id),
        As::User(seeded.owner),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(sensors, json!([]));
    assert_eq!(all, json!([]));
    assert_eq!(device_status, StatusCode::NOT_FOUND);
    assert_eq!(sensor_status, StatusCode::NOT_FOUND);
}
