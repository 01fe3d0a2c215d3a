//! In-memory session storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use tasktrack_core::auth::{is_session_expired, Result, Session, SessionRepository, SessionToken};

/// In-memory session store for single-instance deployments and tests.
///
/// Expired sessions are pruned whenever a new session is created.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    /// Creates a new empty in-memory session store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionStore {
    async fn create_session(&self, session: &Session) -> Result<()> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !is_session_expired(s, now));
        sessions.insert(session.token.as_str().to_string(), session.clone());
        Ok(())
    }

    async fn get_session(&self, token: &SessionToken) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(token.as_str()).cloned())
    }

    async fn delete_session(&self, token: &SessionToken) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tasktrack_core::task::ObjectId;

    fn create_test_session(token: &str, expires_in: Duration) -> Session {
        let now = Utc::now();
        Session {
            token: SessionToken::new(token.to_string()),
            user_id: ObjectId::new(),
            created_at: now,
            expires_at: now + expires_in,
        }
    }

    fn token(s: &str) -> SessionToken {
        SessionToken::new(s.to_string())
    }

    #[tokio::test]
    async fn test_session_create_and_get() {
        let store = InMemorySessionStore::new();
        let session = create_test_session("session-1", Duration::minutes(10));

        store.create_session(&session).await.unwrap();

        let retrieved = store.get_session(&token("session-1")).await.unwrap();
        assert_eq!(retrieved, Some(session));
    }

    #[tokio::test]
    async fn test_session_get_nonexistent() {
        let store = InMemorySessionStore::new();
        let result = store.get_session(&token("nonexistent")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_session_delete() {
        let store = InMemorySessionStore::new();
        let session = create_test_session("session-1", Duration::minutes(10));

        store.create_session(&session).await.unwrap();
        store.delete_session(&token("session-1")).await.unwrap();

        assert!(store
            .get_session(&token("session-1"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_session_delete_nonexistent() {
        let store = InMemorySessionStore::new();
        assert!(store.delete_session(&token("nonexistent")).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_sessions_are_pruned_on_create() {
        let store = InMemorySessionStore::new();
        let stale = create_test_session("stale", -Duration::minutes(1));
        let fresh = create_test_session("fresh", Duration::minutes(10));

        store.create_session(&stale).await.unwrap();
        store.create_session(&fresh).await.unwrap();

        assert!(store.get_session(&token("stale")).await.unwrap().is_none());
        assert!(store.get_session(&token("fresh")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let store = InMemorySessionStore::new();
        let clone = store.clone();

        let session = create_test_session("session-1", Duration::minutes(10));
        store.create_session(&session).await.unwrap();

        assert!(clone
            .get_session(&token("session-1"))
            .await
            .unwrap()
            .is_some());
    }
}
