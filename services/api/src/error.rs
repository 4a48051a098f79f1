//! Custom error types for the playlist API

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the playlist API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// The actor lacks the relationship the operation needs
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Entity id does not resolve
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation failure with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The store failed; `message` is what the client sees
    #[error("{message}: {detail}")]
    Store {
        message: &'static str,
        detail: String,
    },
}

impl ApiError {
    /// Map a store failure to a 500 carrying `message`, logging the cause
    pub fn store(message: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
        move |e| {
            error!("{}: {:#}", message, e);
            ApiError::Store {
                message,
                detail: e.to_string(),
            }
        }
    }

    pub fn not_found(message: &str) -> Self {
        ApiError::NotFound(message.to_string())
    }

    pub fn forbidden(message: &str) -> Self {
        ApiError::Forbidden(message.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Unauthorized" }),
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "message": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "message": msg })),
            ApiError::Store { message, detail } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": message, "error": detail }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
