//! Maps `AppError` and `EnrollmentError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use eventhub_core::error::{AppError, ErrorKind};
use eventhub_service::EnrollmentError;

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Error returned by handlers and extractors.
#[derive(Debug)]
pub enum ApiError {
    /// Infrastructure or request error.
    App(AppError),
    /// Enrollment outcome.
    Enrollment(EnrollmentError),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<EnrollmentError> for ApiError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::Store(app) => Self::App(app),
            other => Self::Enrollment(other),
        }
    }
}

impl ApiError {
    /// Status code and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Enrollment(err) => {
                let status = match err {
                    EnrollmentError::ScheduleNotFound | EnrollmentError::NotFound => {
                        StatusCode::NOT_FOUND
                    }
                    EnrollmentError::CapacityExceeded
                    | EnrollmentError::DuplicateEnrollment
                    | EnrollmentError::TimeConflict => StatusCode::CONFLICT,
                    EnrollmentError::TransientConflict => StatusCode::SERVICE_UNAVAILABLE,
                    EnrollmentError::NotOwner => StatusCode::FORBIDDEN,
                    EnrollmentError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.code())
            }
            Self::App(err) => match err.kind {
                ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                ErrorKind::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                ErrorKind::Database | ErrorKind::Configuration | ErrorKind::Internal => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let message = match &self {
            Self::App(err) if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = %err, kind = %err.kind, "Internal server error");
                "Internal server error".to_string()
            }
            Self::App(err) => err.message.clone(),
            Self::Enrollment(err) => err.to_string(),
        };

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
