use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RekkoError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for RekkoError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            RekkoError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            RekkoError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            RekkoError::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            RekkoError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            RekkoError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            RekkoError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RekkoError>;
