//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use rasterhub_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Engine status code when a render call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_status: Option<i32>,
}

/// Response-side wrapper around [`AppError`].
///
/// Handlers return `Result<_, ApiError>`; the `?` operator converts
/// through the `From` impl below.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, error_code) = match &err.kind {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ErrorKind::UnknownTool => (StatusCode::BAD_REQUEST, "UNKNOWN_TOOL"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ErrorKind::HistoryNotFound => (StatusCode::NOT_FOUND, "HISTORY_NOT_FOUND"),
            ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
            ErrorKind::RenderEngine => {
                tracing::error!(status = ?err.engine_status, "Render engine failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "RENDER_ENGINE_ERROR")
            }
            ErrorKind::SessionInit => {
                tracing::error!(error = %err.message, "Session initialization failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "SESSION_INIT_ERROR")
            }
            ErrorKind::Codec => (StatusCode::INTERNAL_SERVER_ERROR, "CODEC_ERROR"),
            _ => {
                tracing::error!(error = %err.message, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message: err.message.clone(),
            engine_status: err.engine_status,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(AppError::unknown_tool("spray")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::validation("bad color")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::history_not_found("gone")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::conflict("raced")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::render_engine(3, "line")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
