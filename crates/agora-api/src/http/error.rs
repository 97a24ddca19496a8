//! Application error type mapping to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use agora_types::error::{RepositoryError, ValidationError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Message store failure.
    Store(RepositoryError),
    /// Validation error.
    Validation(String),
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Store(e)
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Store(e) => {
                tracing::error!(error = %e, "message store error");
                (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE", e.to_string())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
        };

        let body = json!({
            "errors": [{
                "code": code,
                "message": message,
            }],
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let response = AppError::from(ValidationError::EmptyUsername).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_error_maps_to_service_unavailable() {
        let response = AppError::from(RepositoryError::Connection).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
