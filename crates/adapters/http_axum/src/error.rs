//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use sensorhub_domain::error::{SensorHubError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<ErrorDetail>,
}

/// One rejected item of a batch submission.
#[derive(Serialize)]
struct ErrorDetail {
    index: usize,
    error: String,
}

/// Every failure a handler can answer with.
#[derive(Debug)]
pub enum ApiError {
    /// A failure reported by the application layer.
    Domain(SensorHubError),
    /// No usable identity was forwarded with the request.
    Unauthenticated(&'static str),
    /// The request body could not be decoded.
    MalformedBody(String),
}

impl From<SensorHubError> for ApiError {
    fn from(err: SensorHubError) -> Self {
        Self::Domain(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut details = Vec::new();
        let (status, message) = match self {
            Self::Domain(SensorHubError::Validation(err)) => {
                if let ValidationError::Batch(items) = &err {
                    details = items
                        .iter()
                        .map(|item| ErrorDetail {
                            index: item.index,
                            error: item.error.to_string(),
                        })
                        .collect();
                }
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Domain(SensorHubError::NotFound(err)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Domain(SensorHubError::PermissionDenied(err)) => {
                (StatusCode::FORBIDDEN, err.to_string())
            }
            Self::Domain(SensorHubError::Storage(err)) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            Self::Unauthenticated(reason) => (StatusCode::UNAUTHORIZED, reason.to_string()),
            Self::MalformedBody(reason) => (StatusCode::BAD_REQUEST, reason),
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                details,
            }),
        )
            .into_response()
    }
}
