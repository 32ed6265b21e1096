//! JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cabinstay_core::{AvailabilityError, StoreError};
use serde::Serialize;

/// Error body returned by API handlers.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// Failure of an API handler.
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    Availability(AvailabilityError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl From<AvailabilityError> for ApiError {
    fn from(e: AvailabilityError) -> Self {
        match e {
            AvailabilityError::Store(inner) => ApiError::Store(inner),
            other => ApiError::Availability(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Store(StoreError::NotFound(m)) => (StatusCode::NOT_FOUND, "not_found", m),
            ApiError::Store(StoreError::Conflict(m)) => (StatusCode::CONFLICT, "conflict", m),
            ApiError::Store(StoreError::DataUnavailable(m)) => {
                tracing::error!("Request failed, store unavailable: {}", m);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "data_unavailable",
                    "Data could not be loaded".to_string(),
                )
            }
            ApiError::Availability(e) => {
                tracing::error!("Booking data is inconsistent: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "invalid_interval",
                    e.to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error, message })).into_response()
    }
}
