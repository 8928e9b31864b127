//! Custom error types for the API service

use axum::{
    Json,
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use wardrobe::WardrobeError;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing, invalid, expired or revoked token
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The token's user no longer exists
    #[error("Owner not found")]
    OwnerNotFound,

    /// Missing resource, or one owned by someone else
    #[error("Not found")]
    NotFound,

    /// Malformed multipart body
    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl From<WardrobeError> for ApiError {
    fn from(err: WardrobeError) -> Self {
        match err {
            WardrobeError::Validation(message) => ApiError::BadRequest(message),
            WardrobeError::OwnerNotFound(_) => ApiError::OwnerNotFound,
            WardrobeError::NotFound => ApiError::NotFound,
            WardrobeError::Store(e) => {
                error!("Store failure: {}", e);
                ApiError::InternalServerError
            }
            WardrobeError::Blob(e) => {
                error!("Image storage failure: {}", e);
                ApiError::InternalServerError
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::OwnerNotFound => (StatusCode::UNAUTHORIZED, "Owner not found".to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::Multipart(e) => (e.status(), e.body_text()),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
