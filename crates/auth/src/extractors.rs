//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
};
use chrono::Utc;
use tasktrack_core::auth::{is_session_expired, parse_token, SessionToken};
use tasktrack_core::user::User;

use crate::AuthState;

/// Reads the session token from the `Authorization` header.
///
/// Accepts a bare token or `Bearer <token>`.
pub(crate) fn token_from_headers(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_token)
}

/// Extractor for the authenticated user.
///
/// Rejects with 403 when no valid session is presented and 500 when the
/// session or user lookup fails.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let token = token_from_headers(&parts.headers)
            .ok_or((StatusCode::FORBIDDEN, "No session token"))?;

        let session = auth_state
            .sessions
            .get_session(&token)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Session lookup failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Session lookup failed")
            })?
            .ok_or((StatusCode::FORBIDDEN, "Session not found"))?;

        if is_session_expired(&session, Utc::now()) {
            return Err((StatusCode::FORBIDDEN, "Session expired"));
        }

        let user = auth_state
            .users
            .get_user(session.user_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = %session.user_id, "User lookup failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "User lookup failed")
            })?
            .ok_or((StatusCode::FORBIDDEN, "User not found"))?;

        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request, routing::get, Router};
    use chrono::Duration;
    use tasktrack_core::auth::{generate_session_token, Session, SessionRepository};
    use tasktrack_core::storage::UserRepository;
    use tower::ServiceExt;

    use super::*;
    use crate::test_support::MockUsers;
    use crate::{AuthConfig, InMemorySessionStore};

    async fn whoami(CurrentUser(user): CurrentUser) -> String {
        user.username
    }

    struct Fixture {
        app: Router,
        sessions: Arc<InMemorySessionStore>,
        user: User,
    }

    async fn fixture() -> Fixture {
        let sessions = Arc::new(InMemorySessionStore::new());
        let users = Arc::new(MockUsers::default());
        let user = User::new("alice", "alice@example.com", "digest");
        users.create_user(&user).await.unwrap();

        let state = AuthState::new(sessions.clone(), users, AuthConfig::default());
        let app = Router::new().route("/me", get(whoami)).with_state(state);
        Fixture {
            app,
            sessions,
            user,
        }
    }

    async fn session_for(fixture: &Fixture, ttl: Duration) -> String {
        let now = Utc::now();
        let session = Session {
            token: generate_session_token(),
            user_id: fixture.user.id,
            created_at: now,
            expires_at: now + ttl,
        };
        fixture.sessions.create_session(&session).await.unwrap();
        session.token.to_string()
    }

    async fn status_with_header(app: Router, header: Option<String>) -> StatusCode {
        let mut request = Request::builder().uri("/me");
        if let Some(value) = header {
            request = request.header(AUTHORIZATION, value);
        }
        app.oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_raw_token_is_accepted() {
        let fixture = fixture().await;
        let token = session_for(&fixture, Duration::minutes(10)).await;
        assert_eq!(
            status_with_header(fixture.app, Some(token)).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_bearer_token_is_accepted() {
        let fixture = fixture().await;
        let token = session_for(&fixture, Duration::minutes(10)).await;
        assert_eq!(
            status_with_header(fixture.app, Some(format!("Bearer {token}"))).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_missing_header_is_forbidden() {
        let fixture = fixture().await;
        assert_eq!(
            status_with_header(fixture.app, None).await,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_unknown_token_is_forbidden() {
        let fixture = fixture().await;
        assert_eq!(
            status_with_header(fixture.app, Some("unknown".to_string())).await,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_expired_session_is_forbidden() {
        let fixture = fixture().await;
        let token = session_for(&fixture, -Duration::seconds(1)).await;
        assert_eq!(
            status_with_header(fixture.app, Some(token)).await,
            StatusCode::FORBIDDEN
        );
    }
}
