//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.
//! Storage failures are logged and answered with an opaque 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::gateway::GatewayError;
use crate::models::{Consultation, ValidationError};

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed input (400)
    Validation(ValidationError),

    /// Slot already booked (400, carries the conflicting record)
    ScheduleConflict { existing: Box<Consultation> },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: i64 },

    /// Unique field already taken (409)
    Duplicate { field: &'static str },

    /// Referenced row does not exist (422)
    MissingReference { reference: &'static str },

    /// Internal error (500, logged)
    Internal { message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => {
                tracing::warn!(error = %e, "rejected request");
                (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "validation_error",
                        "message": e.to_string()
                    }),
                )
            }
            Self::ScheduleConflict { existing } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "schedule_conflict",
                    "message": "a consultation is already scheduled for this time",
                    "conflict": existing
                }),
            ),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("{} {} not found", resource, id)
                }),
            ),
            Self::Duplicate { field } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "duplicate",
                    "message": format!("{} already registered", field)
                }),
            ),
            Self::MissingReference { reference } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": "missing_reference",
                    "message": format!("referenced {} does not exist", reference)
                }),
            ),
            Self::Internal { message } => {
                // Log the actual error, return generic message
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::NotFound { resource, id } => Self::NotFound { resource, id },
            GatewayError::ScheduleConflict { existing } => Self::ScheduleConflict { existing },
            GatewayError::Referential { reference } => Self::MissingReference { reference },
            GatewayError::Uniqueness { field } => Self::Duplicate { field },
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}
