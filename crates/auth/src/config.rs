use std::time::Duration;

const DEFAULT_SESSION_TTL_SECONDS: u64 = 600;

/// Auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECONDS),
        }
    }
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SESSION_TTL_SECONDS`: Session lifetime in seconds (default: 600)
    pub fn from_env() -> Self {
        let session_ttl = std::env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_SESSION_TTL_SECONDS));

        Self { session_ttl }
    }

    /// Session lifetime as a `chrono` duration for expiry arithmetic.
    pub fn session_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.session_ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_SESSION_TTL_SECONDS as i64))
    }
}
