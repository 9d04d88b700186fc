//! Mapping from core errors to HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use folio_core::CoreError;
use serde_json::json;
use tracing::{error, warn};

/// Error returned by every handler, rendered as `{"error": message}`
#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    /// Request body or query string could not be decoded
    BadRequest(String),
    /// Blocking task panicked or was cancelled
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(err) if err.is_validation() => StatusCode::BAD_REQUEST,
            ApiError::Core(CoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Core(err) if err.is_service() => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Core(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Core(err) => err.to_string(),
            ApiError::BadRequest(msg) | ApiError::Internal(msg) => msg.clone(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Core(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("background task failed: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                ApiError::Core(err) => error!(error = ?err, "Request failed"),
                other => error!("Request failed: {}", other.message()),
            }
        } else {
            warn!(status = status.as_u16(), "Rejected request: {}", self.message());
        }

        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
