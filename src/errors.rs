use axum::{
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
    http::StatusCode,
    Json
};
use thiserror::Error;
use tracing::error;

use crate::repo::RepoError;
use crate::storage::StorageError;

/// Errors returned by HTTP handlers
///
/// Every variant renders as a JSON body of the form `{"error": "..."}`.
/// Internal failures are logged in full and reported to the client with a
/// generic message.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(anyhow::Error),
    #[error("Not found")]
    NotFound,
    #[error("Authentication required")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<RepoError>() {
            Some(RepoError::NotFound(_)) => ApiError::NotFound,
            Some(RepoError::Validation(msg)) => ApiError::Validation(msg.clone()),
            Some(
                e @ (RepoError::Conflict(_)
                | RepoError::InvalidTransition { .. }
                | RepoError::InsufficientStock { .. }),
            ) => ApiError::Conflict(e.to_string()),
            None => ApiError::Database(err),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::Validation(err.body_text())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::Validation(err.body_text())
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(err: QueryRejection) -> Self {
        ApiError::Validation(err.body_text())
    }
}

impl From<axum_extra::extract::QueryRejection> for ApiError {
    fn from(err: axum_extra::extract::QueryRejection) -> Self {
        ApiError::Validation(err.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(err: PathRejection) -> Self {
        ApiError::Validation(err.body_text())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnsupportedType(_) => ApiError::UnsupportedMediaType(err.to_string()),
            StorageError::TooLarge { .. } => ApiError::PayloadTooLarge(err.to_string()),
            StorageError::Empty | StorageError::InvalidKey(_) => ApiError::Validation(err.to_string()),
            StorageError::NotFound(_) => ApiError::NotFound,
            StorageError::Io(e) => ApiError::Database(anyhow::Error::new(e).context("Upload storage failed")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                error!("Internal error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required".to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::UnsupportedMediaType(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests;
