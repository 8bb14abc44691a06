use axum::{
    http::StatusCode,
    response::{IntoResponse, Response, Json},
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Upload input rejected before any processing happened.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("file too large: {size} bytes exceeds the {max} byte limit")]
    FileTooLarge { size: usize, max: usize },

    #[error("invalid file type: {0}")]
    InvalidFileType(String),
}

#[derive(Debug, Error)]
pub enum NotFoundError {
    #[error("spot {0} not found")]
    Parent(Uuid),

    #[error("photo {0} not found")]
    Photo(Uuid),
}

/// Object store failure, surfaced verbatim from the SDK.
#[derive(Debug, Error)]
#[error("object store {op} failed for {key}: {message}")]
pub struct StorageError {
    pub op: &'static str,
    pub key: String,
    pub message: String,
}

impl StorageError {
    pub fn new(op: &'static str, key: impl Into<String>, message: impl ToString) -> Self {
        Self {
            op,
            key: key.into(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
#[error("failed to decode image: {0}")]
pub struct DecodeError(pub String);

/// Errors returned by the photo lifecycle engine.
#[derive(Debug, Error)]
pub enum PhotoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error("spot {parent_id} already has the maximum of {max} photos")]
    LimitExceeded { parent_id: Uuid, max: u64 },

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("persistence error: {0}")]
    Persistence(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub type PhotoResult<T> = Result<T, PhotoError>;

#[derive(Debug)]
pub enum AppError {
    DatabaseError(sea_orm::DbErr),
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Conflict(String),
    UnprocessableEntity(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::DatabaseError(e) => {
                tracing::error!(error = %e, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::DatabaseError(err)
    }
}

impl From<PhotoError> for AppError {
    fn from(err: PhotoError) -> Self {
        match err {
            PhotoError::Validation(e) => AppError::BadRequest(e.to_string()),
            PhotoError::NotFound(e) => AppError::NotFound(e.to_string()),
            e @ PhotoError::LimitExceeded { .. } => AppError::Conflict(e.to_string()),
            PhotoError::Forbidden(msg) => AppError::Forbidden(msg),
            PhotoError::Decode(e) => AppError::UnprocessableEntity(e.to_string()),
            PhotoError::Storage(e) => AppError::InternalServerError(e.to_string()),
            PhotoError::Persistence(e) => AppError::DatabaseError(e),
        }
    }
}
