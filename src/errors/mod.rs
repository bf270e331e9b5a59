use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use log::error;
use crate::db::StoreError;

/// Field name (as seen by clients) to every message raised against it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred while processing the request.";

#[derive(Debug, Error)]
pub enum AppError {
    /// Body or path could not be parsed into the expected shape.
    #[error("{0}")]
    BadRequest(String),
    #[error("One or more validation errors occurred.")]
    Validation(FieldErrors),
    #[error("ID mismatch.")]
    IdMismatch,
    #[error("Department with ID {0} does not exist.")]
    MissingDepartment(i32),
    #[error("{entity} with ID {id} not found.")]
    NotFound { entity: &'static str, id: i32 },
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("concurrency conflict: {0}")]
    ConcurrencyConflict(String),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("internal error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        AppError::NotFound { entity, id }
    }
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a FieldErrors>,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_)
            | AppError::Validation(_)
            | AppError::IdMismatch
            | AppError::MissingDepartment(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::ConstraintViolation(_)
            | AppError::ConcurrencyConflict(_)
            | AppError::Database(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            AppError::Validation(errors) => ErrorResponse {
                error: self.to_string(),
                errors: Some(errors),
            },
            // Server-side detail stays in the log.
            _ if status.is_server_error() => {
                error!("Request failed: {}", self);
                ErrorResponse {
                    error: INTERNAL_ERROR_MESSAGE.to_string(),
                    errors: None,
                }
            }
            _ => ErrorResponse {
                error: self.to_string(),
                errors: None,
            },
        };
        HttpResponse::build(status).json(body)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => AppError::NotFound { entity, id },
            StoreError::ConstraintViolation(msg) => AppError::ConstraintViolation(msg),
            StoreError::ConcurrencyConflict { entity, id } => {
                AppError::ConcurrencyConflict(format!("{} with ID {} vanished during update", entity, id))
            }
            StoreError::Database(err) => AppError::Database(err),
        }
    }
}

impl From<actix_web::error::UrlGenerationError> for AppError {
    fn from(err: actix_web::error::UrlGenerationError) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}
