//! HTTP handlers for auth routes.

use axum::{
    extract::{FromRef, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tasktrack_core::auth::{
    calculate_expiry, generate_session_token, hash_password, is_session_expired, verify_password,
    AuthError as CoreError, Session,
};
use tasktrack_core::serde_ext::deserialize_optional_string;
use tasktrack_core::task::ObjectId;
use tasktrack_core::user::User;

use crate::error::AuthError;
use crate::extractors::token_from_headers;
use crate::AuthState;

/// Request payload for `POST /signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub password: Option<String>,
}

/// Request payload for `POST /signin`.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub message: String,
    pub new_token: String,
}

/// Creates the auth router.
///
/// Routes:
/// - `POST /signup` - Register a user
/// - `POST /signin` - Exchange credentials for a session token
/// - `POST /refresh` - Rotate the presented session token
/// - `POST /signout` - End the presented session
pub fn auth_routes<S>() -> Router<S>
where
    AuthState: FromRef<S>,
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/refresh", post(refresh))
        .route("/signout", post(signout))
}

async fn signup(
    State(state): State<AuthState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AuthError> {
    let username = request.username.trim();
    let email = request.email.trim();
    if username.is_empty() || email.is_empty() {
        return Err(AuthError::Validation(
            "username and email are required".to_string(),
        ));
    }
    let password = request
        .password
        .ok_or_else(|| AuthError::Validation("password is required".to_string()))?;

    let user = User::new(username, email, hash_password(&password));
    state.users.create_user(&user).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".to_string(),
        }),
    ))
}

async fn signin(
    State(state): State<AuthState>,
    Json(request): Json<SigninRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let user = state
        .users
        .get_user_by_username(request.username.trim())
        .await?
        .filter(|user| verify_password(&request.password, &user.password_hash))
        .ok_or(CoreError::InvalidCredentials)?;

    let session = issue_session(&state, user.id).await?;
    tracing::debug!(user_id = %user.id, "User signed in");

    Ok(Json(TokenResponse {
        message: "User signed in".to_string(),
        token: session.token.to_string(),
    }))
}

async fn refresh(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, AuthError> {
    let token = token_from_headers(&headers).ok_or(AuthError::MissingToken)?;

    let session = state
        .sessions
        .get_session(&token)
        .await?
        .ok_or(CoreError::SessionNotFound)?;

    state.sessions.delete_session(&token).await?;

    if is_session_expired(&session, Utc::now()) {
        return Err(CoreError::SessionExpired.into());
    }

    let renewed = issue_session(&state, session.user_id).await?;
    tracing::debug!(user_id = %session.user_id, "Session refreshed");

    Ok(Json(RefreshResponse {
        message: "Session refreshed".to_string(),
        new_token: renewed.token.to_string(),
    }))
}

async fn signout(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, AuthError> {
    let token = token_from_headers(&headers).ok_or(AuthError::MissingToken)?;
    state.sessions.delete_session(&token).await?;

    Ok(Json(MessageResponse {
        message: "Signed out".to_string(),
    }))
}

/// Creates and stores a fresh session for `user_id`.
async fn issue_session(state: &AuthState, user_id: ObjectId) -> Result<Session, AuthError> {
    let now = Utc::now();
    let session = Session {
        token: generate_session_token(),
        user_id,
        created_at: now,
        expires_at: calculate_expiry(now, state.config.session_ttl_chrono()),
    };
    state.sessions.create_session(&session).await?;
    Ok(session)
}
