use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docseek_core::EngineError;
use serde_json::json;
use std::io;

/// Handler error rendered as `{"error": message}` with a matching status code.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match &err {
            EngineError::OutOfRange { .. } => ApiError::NotFound(err.to_string()),
            EngineError::Io(e) if e.kind() == io::ErrorKind::NotFound => ApiError::NotFound(err.to_string()),
            EngineError::NotIndexed
            | EngineError::EmptyCorpus
            | EngineError::PreprocessingFailure { .. }
            | EngineError::Config(_) => ApiError::BadRequest(err.to_string()),
            EngineError::IndexingFailure(_) | EngineError::Io(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("background task failed: {err}"))
    }
}
