use axum::{
    Json,
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Message returned for every store, upload, transport or malformed-request failure. Internal
/// detail goes to the log only.
pub const PROCESSING_ERROR: &str = "Your request could not be processed. Please try again.";

/// AppError
///
/// The error taxonomy shared by the repository, the upload sink and the
/// handlers. `IntoResponse` maps each variant to its HTTP status and body.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("invalid JSON body: {0}")]
    JsonBody(#[from] JsonRejection),

    #[error("invalid path: {0}")]
    PathParam(#[from] PathRejection),

    #[error("browse counter overflow on article {0}")]
    BrowseOverflow(Uuid),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn article_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("Cannot find article with the id: {}.", id))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(msg) | AppError::Conflict(msg) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" })),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                json!({ "error": "You are not allowed to make this request." }),
            ),
            AppError::Database(_)
            | AppError::Storage(_)
            | AppError::Multipart(_)
            | AppError::JsonBody(_)
            | AppError::PathParam(_)
            | AppError::BrowseOverflow(_) => {
                tracing::error!(error = %self, "request processing failed");
                (StatusCode::BAD_REQUEST, json!({ "error": PROCESSING_ERROR }))
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
