//! Redis session storage implementation.

use async_trait::async_trait;
use chrono::Utc;
use fred::prelude::*;
use tasktrack_core::auth::{AuthError, Result, Session, SessionRepository, SessionToken};

/// Redis-backed session storage. Keys expire together with the session.
pub struct RedisSessionStore {
    pool: Pool,
}

impl RedisSessionStore {
    /// Creates a new Redis session store over an initialized pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Connects a pool of `size` clients to `url` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the URL is invalid or the initial
    /// connection fails.
    pub async fn connect(url: &str, size: usize) -> Result<Self> {
        let config = Config::from_url(url).map_err(|e| AuthError::Storage(e.to_string()))?;
        let pool = Builder::from_config(config)
            .build_pool(size)
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        pool.init()
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        Ok(Self::new(pool))
    }

    fn session_key(token: &SessionToken) -> String {
        format!("session:{}", token)
    }
}

#[async_trait]
impl SessionRepository for RedisSessionStore {
    async fn create_session(&self, session: &Session) -> Result<()> {
        let key = Self::session_key(&session.token);
        let value =
            serde_json::to_string(session).map_err(|e| AuthError::Storage(e.to_string()))?;

        let ttl_secs = (session.expires_at - Utc::now()).num_seconds().max(1);

        self.pool
            .set::<(), _, _>(&key, value, Some(Expiration::EX(ttl_secs)), None, false)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn get_session(&self, token: &SessionToken) -> Result<Option<Session>> {
        let key = Self::session_key(token);
        let value: Option<String> = self
            .pool
            .get(&key)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        match value {
            Some(json) => {
                let session: Session =
                    serde_json::from_str(&json).map_err(|e| AuthError::Storage(e.to_string()))?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn delete_session(&self, token: &SessionToken) -> Result<()> {
        let key = Self::session_key(token);
        self.pool
            .del::<(), _>(&key)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        Ok(())
    }
}
