//! Application state for auth.

use std::sync::Arc;

use axum::extract::FromRef;
use tasktrack_core::auth::SessionRepository;
use tasktrack_core::storage::UserRepository;

use crate::config::AuthConfig;

/// Shared state for auth handlers.
#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<dyn SessionRepository>,
    pub users: Arc<dyn UserRepository>,
    pub config: AuthConfig,
}

impl AuthState {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        users: Arc<dyn UserRepository>,
        config: AuthConfig,
    ) -> Self {
        Self {
            sessions,
            users,
            config,
        }
    }
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}
