//! Error types and their HTTP mapping
//!
//! Every error leaves the API as `{"detail": "..."}` with a status code chosen
//! in [`AppError::status_code`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::Detail;

/// Failures raised by [`crate::database::UrlStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key '{0}' already exists")]
    KeyConflict(String),

    #[error("secret key already exists")]
    SecretConflict,

    #[error("no record stored under key '{0}'")]
    Missing(String),

    #[error(transparent)]
    Database(#[from] redb::DatabaseError),

    #[error(transparent)]
    Transaction(#[from] redb::TransactionError),

    #[error(transparent)]
    Table(#[from] redb::TableError),

    #[error(transparent)]
    Storage(#[from] redb::StorageError),

    #[error(transparent)]
    Commit(#[from] redb::CommitError),

    #[error("corrupt record: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors surfaced by the link service and the HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Your provided URL is not valid.")]
    InvalidUrl,

    #[error("Your provided custom key is not valid.")]
    InvalidKey,

    #[error("Your provided custom key has already been taken.")]
    KeyTaken,

    #[error("URL '{0}' doesn't exist")]
    NotFound(String),

    #[error("Target URL does not exist.")]
    UnreachableTarget,

    #[error("Could not allocate a unique key, please try again later.")]
    KeySpaceExhausted,

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidUrl
            | AppError::InvalidKey
            | AppError::KeyTaken
            | AppError::UnreachableTarget => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::KeySpaceExhausted => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            AppError::Storage(err) => {
                tracing::error!(error = %err, "storage failure while handling request");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(Detail { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidUrl.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::KeyTaken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::UnreachableTarget.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("http://localhost:8000/x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::KeySpaceExhausted.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Storage(StoreError::SecretConflict).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message_names_the_url() {
        let err = AppError::NotFound("http://localhost:8000/abc".into());
        assert_eq!(err.to_string(), "URL 'http://localhost:8000/abc' doesn't exist");
    }
}
