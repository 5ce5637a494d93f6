//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{CreationError, LifecycleError};
use order_store::StoreError;
use reporting::ReportingError;
use service::ServiceError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Service-level error.
    Service(ServiceError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Service(err) => service_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn service_error_to_response(err: ServiceError) -> (StatusCode, String) {
    let status = match &err {
        ServiceError::Lifecycle(lifecycle_err) => match lifecycle_err {
            LifecycleError::NotFound(_) => StatusCode::NOT_FOUND,
            LifecycleError::InvalidTransition { .. }
            | LifecycleError::AlreadyTerminal(_)
            | LifecycleError::Conflict(_) => StatusCode::CONFLICT,
            LifecycleError::ReasonRequired => StatusCode::BAD_REQUEST,
            LifecycleError::Forbidden { .. } => StatusCode::FORBIDDEN,
        },
        ServiceError::Creation(creation_err) => match creation_err {
            CreationError::EmptyCart
            | CreationError::InvalidItem { .. }
            | CreationError::InvalidAddress => StatusCode::BAD_REQUEST,
        },
        ServiceError::Store(store_err) => match store_err {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::VersionConflict { .. } | StoreError::DuplicateOrderNumber(_) => {
                StatusCode::CONFLICT
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        ServiceError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "request failed");
    }

    (status, err.to_string())
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<ReportingError> for ApiError {
    fn from(err: ReportingError) -> Self {
        match err {
            ReportingError::Store(store_err) => ApiError::Service(ServiceError::Store(store_err)),
        }
    }
}
