#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// `NameUnrecoverable` and `Cancelled` are deliberately absent: the first is
/// ingestion-internal (it becomes a per-file `failed` record, never an HTTP
/// error), the second is orchestrator-internal (it never reaches a caller).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid PDF: {0}")]
    PdfInvalid(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Insufficient content: {0}")]
    InsufficientContent(String),

    #[error("LLM schema violation: {0}")]
    LlmSchemaViolation(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::PdfInvalid(msg) => (StatusCode::BAD_REQUEST, "PDF_INVALID", msg.clone()),
            AppError::FetchFailed(msg) => (StatusCode::BAD_REQUEST, "FETCH_FAILED", msg.clone()),
            AppError::InsufficientContent(msg) => (
                StatusCode::BAD_REQUEST,
                "INSUFFICIENT_CONTENT",
                msg.clone(),
            ),
            AppError::LlmSchemaViolation(msg) => {
                tracing::error!("LLM schema violation: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_SCHEMA_VIOLATION",
                    "The AI provider returned a response that did not match the expected shape"
                        .to_string(),
                )
            }
            AppError::LlmUnavailable(msg) => {
                tracing::error!("LLM unavailable: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_UNAVAILABLE",
                    "The AI provider is currently unavailable".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// True when a Postgres unique-constraint violation underlies this error —
/// used to turn a race-lost insert into `Conflict` instead of `Internal`.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.constraint().is_some() && db.code().as_deref() == Some("23505"))
}
