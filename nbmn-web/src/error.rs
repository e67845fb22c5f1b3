//! Error types for nbmn-web

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// No identity supplied (401)
    #[error("Login required: {0}")]
    Unauthorized(String),

    /// Identity lacks admin rights (403)
    #[error("Not authorized: {0}")]
    Forbidden(String),

    /// Submitted record failed validation (422); `model` is the record as
    /// submitted so the editor can be redisplayed
    #[error("Validation failed: {}", .messages.join(". "))]
    Validation { messages: Vec<String>, model: Value },

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// nbmn-common error
    #[error("Common error: {0}")]
    Common(#[from] nbmn_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, extra) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg, None),
            ApiError::Validation { messages, model } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION",
                messages.join(". "),
                Some(json!({"errors": messages, "edit": model})),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
                None,
            ),
            ApiError::Common(err) => match err {
                nbmn_common::Error::InvalidInput(msg) => {
                    (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None)
                }
                nbmn_common::Error::NotFound(msg) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None)
                }
                other => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "COMMON_ERROR",
                    other.to_string(),
                    None,
                ),
            },
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, "{}", message);
        }

        let mut body = json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });
        if let (Some(Value::Object(extra)), Some(obj)) = (extra, body.as_object_mut()) {
            obj.extend(extra);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
