use std::{env, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache TTL in seconds (default: 600)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    /// Note: Only used when the `memory` feature is enabled.
    #[allow(dead_code)]
    pub cache_max_entries: usize,
    /// Treat cache read errors as misses instead of failing the request (default: false)
    pub cache_fail_open: bool,
    /// Deadline for reads, creates and deletes in seconds (default: 5)
    pub request_timeout_seconds: u64,
    /// Deadline for updates in seconds (default: 8)
    pub update_timeout_seconds: u64,
    /// Path to SQLite database file (default: "tasktrack.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` or `auth-redis` feature is enabled.
    #[allow(dead_code)]
    pub redis_url: String,
    /// Allowed CORS origins. Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 600)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `CACHE_FAIL_OPEN` - `true`/`1` to serve from the store when the cache errors (default: false)
    /// - `REQUEST_TIMEOUT_SECONDS` - Per-request deadline (default: 5)
    /// - `UPDATE_TIMEOUT_SECONDS` - Per-request deadline for updates (default: 8)
    /// - `SQLITE_PATH` - SQLite database path (default: "tasktrack.db")
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    /// - `ALLOWED_ORIGINS` - Comma separated CORS origins (default: any)
    pub fn from_env() -> Self {
        Self {
            cache_ttl_seconds: parse_var("CACHE_TTL_SECONDS").unwrap_or(600),
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES").unwrap_or(10_000),
            cache_fail_open: env::var("CACHE_FAIL_OPEN")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            request_timeout_seconds: parse_var("REQUEST_TIMEOUT_SECONDS").unwrap_or(5),
            update_timeout_seconds: parse_var("UPDATE_TIMEOUT_SECONDS").unwrap_or(8),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "tasktrack.db".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn update_timeout(&self) -> Duration {
        Duration::from_secs(self.update_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: 600,
            cache_max_entries: 10_000,
            cache_fail_open: false,
            request_timeout_seconds: 5,
            update_timeout_seconds: 8,
            sqlite_path: "tasktrack.db".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty() && *origin != "*")
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations() {
        let config = Config {
            cache_ttl_seconds: 600,
            request_timeout_seconds: 5,
            update_timeout_seconds: 8,
            ..Config::default()
        };

        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.update_timeout(), Duration::from_secs(8));
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();

        assert_eq!(config.cache_ttl_seconds, 600);
        assert_eq!(config.cache_max_entries, 10_000);
        assert!(!config.cache_fail_open);
        assert_eq!(config.sqlite_path, "tasktrack.db");
        assert_eq!(config.redis_url, "redis://localhost:6379");
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://a.test, http://b.test,,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(parse_origins("*").is_empty());
    }
}
