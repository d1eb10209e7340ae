use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the whole backend.
///
/// User-correctable problems (bad input, chat before any ingestion) map to
/// 400; everything else maps to 500. A failed ingestion leaves the previous
/// index and chain untouched, so a 500 from `/upload` means "nothing
/// changed", not "state is halfway".
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("no document has been ingested yet")]
    NotReady,
    #[error("ingestion failed: {0}")]
    Ingestion(String),
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }

    pub fn ingestion<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Ingestion(err.to_string())
    }

    pub fn generation<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Generation(err.to_string())
    }

    pub fn storage<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::SourceUnavailable(msg) => {
                (StatusCode::BAD_REQUEST, format!("Source unavailable: {msg}"))
            }
            ApiError::NotReady => (
                StatusCode::BAD_REQUEST,
                "No document has been uploaded yet. Please upload a document first.".to_string(),
            ),
            ApiError::Ingestion(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Ingestion failed: {msg}"),
            ),
            ApiError::Storage(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Storage failure: {msg}"),
            ),
            ApiError::Generation(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Generation failed: {msg}"),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
