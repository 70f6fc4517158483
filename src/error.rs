//! Typed errors and HTTP mapping.

use crate::validation::FieldViolation;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Registry construction failures. Raised before the process accepts traffic.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("duplicate entity name: '{0}'")]
    DuplicateEntityName(String),
    #[error("no record types registered")]
    Empty,
}

/// Failures from a storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("row encoding: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("invalid row: {0}")]
    InvalidRow(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("unknown entity: '{0}'")]
    UnknownEntity(String),
    #[error("validation failed")]
    Validation(Vec<FieldViolation>),
    #[error("malformed body: {0}")]
    MalformedBody(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::AlreadyExists(_) => (StatusCode::CONFLICT, "already_exists"),
            AppError::UnknownEntity(_) => (StatusCode::NOT_FOUND, "unknown_entity"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::MalformedBody(_) => (StatusCode::BAD_REQUEST, "malformed_body"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Registry(_) => (StatusCode::INTERNAL_SERVER_ERROR, "registry_error"),
            AppError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
        };
        let details = match &self {
            AppError::Validation(violations) => serde_json::to_value(violations).ok(),
            _ => None,
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn status_mapping() {
        let cases = [
            (AppError::NotFound("demo 1".into()), StatusCode::NOT_FOUND),
            (AppError::AlreadyExists("demo".into()), StatusCode::CONFLICT),
            (AppError::UnknownEntity("nope".into()), StatusCode::NOT_FOUND),
            (
                AppError::Validation(vec![FieldViolation::new("f", "bad")]),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppError::MalformedBody("eof".into()), StatusCode::BAD_REQUEST),
            (AppError::BadRequest("bad id".into()), StatusCode::BAD_REQUEST),
            (
                AppError::Registry(RegistryError::Empty),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn validation_error_carries_field_details() {
        let err = AppError::Validation(vec![FieldViolation::new("description", "too long")]);
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
