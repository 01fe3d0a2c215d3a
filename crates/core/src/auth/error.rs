use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("session not found")]
    SessionNotFound,

    #[error("session expired")]
    SessionExpired,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("storage error: {0}")]
    Storage(String),
}
