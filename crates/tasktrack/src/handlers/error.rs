use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use tasktrack_core::storage::{repository_error_to_status_code, RepositoryError};
use tasktrack_core::task::{ObjectIdError, TaskError};

/// Handler error. Anything convertible into `anyhow::Error` can be returned
/// with `?`; the status code is chosen from the concrete error type.
pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        if let Some(repo_error) = self.0.downcast_ref::<RepositoryError>() {
            let code = repository_error_to_status_code(repo_error);
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        } else if self.0.is::<ObjectIdError>() || self.0.is::<TaskError>() {
            StatusCode::BAD_REQUEST
        } else if let Some(rejection) = self.0.downcast_ref::<JsonRejection>() {
            rejection.status()
        } else if let Some(rejection) = self.0.downcast_ref::<PathRejection>() {
            rejection.status()
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "Request failed");
            match status {
                StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => self.0.to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            tracing::debug!(status = %status, error = %self.0, "Request rejected");
            self.0.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
