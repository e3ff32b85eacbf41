//! API error types with HTTP response mapping.

use application::{ServiceError, Step};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::Validation { .. } => StatusCode::BAD_REQUEST,
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::InvalidState { .. } => StatusCode::CONFLICT,
            ServiceError::CorruptData { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Persistence {
                step: Step::Begin, ..
            } => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ServiceError::Publish { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = serde_json::json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
            "committed": self.0.is_committed(),
        });
        (status, axum::Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}
