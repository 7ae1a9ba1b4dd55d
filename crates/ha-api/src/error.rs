//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ha_relations::RelationsError;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

use crate::loader::LoadError;

/// Errors returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// The query parameters were missing or malformed
    #[error("{0}")]
    BadRequest(String),

    #[error("Failed to build relations tree: {0}")]
    Load(#[from] LoadError),

    #[error("Failed to build relations tree: {0}")]
    Task(#[from] JoinError),
}

impl From<RelationsError> for ApiError {
    fn from(err: RelationsError) -> Self {
        match err {
            RelationsError::InvalidDepth(_) => {
                ApiError::BadRequest("Depth must be 0 or a positive number".to_string())
            }
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Load(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Error building relations tree: {}", self);
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}
