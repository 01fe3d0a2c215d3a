use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tasktrack_core::storage::{repository_error_to_status_code, RepositoryError};
use thiserror::Error;

/// Auth errors for the tasktrack_auth crate.
///
/// This wraps the core `AuthError` and adds the request-level failures that
/// only exist at the HTTP edge.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (session state, credentials, storage)
    #[error(transparent)]
    Core(#[from] tasktrack_core::auth::AuthError),

    /// Error from the user repository
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Request payload failed validation
    #[error("{0}")]
    Validation(String),

    /// No session token was presented
    #[error("no active session")]
    MissingToken,
}

impl AuthError {
    fn status(&self) -> StatusCode {
        use tasktrack_core::auth::AuthError as CoreError;

        match self {
            AuthError::Core(CoreError::SessionNotFound | CoreError::SessionExpired)
            | AuthError::Core(CoreError::InvalidCredentials)
            | AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::Core(CoreError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Repository(err) => StatusCode::from_u16(repository_error_to_status_code(err))
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Auth error");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
