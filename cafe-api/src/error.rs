use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cafe_core::CoreError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    UpstreamError(String),
    #[error("{0}")]
    UpstreamTimeout(String),
    #[error("{0}")]
    InternalServerError(String),
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(msg) => AppError::ValidationError(msg),
            CoreError::NetworkError(msg) => AppError::UpstreamError(msg),
            e @ CoreError::Timeout(_) => AppError::UpstreamTimeout(e.to_string()),
            e @ (CoreError::StorageError(_) | CoreError::InternalError(_)) => {
                AppError::InternalServerError(e.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::UpstreamError(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::UpstreamTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
