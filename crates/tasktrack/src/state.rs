//! Application state with repository-based storage.
//!
//! This module defines the shared application state that is passed to all
//! request handlers. Storage and cache backends are picked by feature flags
//! and hidden behind trait objects once assembled.

use std::sync::Arc;
use std::time::Duration;

use tasktrack_auth::{AuthConfig, AuthState};
use tasktrack_core::auth::SessionRepository;
use tasktrack_core::cache::{Cache, CacheStats};
use tasktrack_core::storage::{TaskRepository, TaskStore, UserRepository};

use crate::config::Config;
use crate::storage::cached::{CacheMetrics, CachedTaskRepository};

// ============================================================================
// Compile-time feature validation
// ============================================================================

// Storage features: exactly one must be enabled, they are mutually exclusive
#[cfg(all(feature = "sqlite", feature = "inmemory"))]
compile_error!("Cannot enable both 'sqlite' and 'inmemory' storage features");

#[cfg(not(any(feature = "inmemory", feature = "sqlite")))]
compile_error!("Must enable exactly one storage feature: 'inmemory' or 'sqlite'");

/// Shared application state.
///
/// Cloned for each request handler. Everything inside is an `Arc` handle.
#[derive(Clone)]
pub struct AppState {
    /// Task repository (cached, wraps the underlying store).
    pub tasks: Arc<dyn TaskRepository>,
    /// Counters of the cache-aside layer, reported by `/healthz`.
    pub metrics: Arc<CacheMetrics>,
    /// Sessions and users for the auth routes and `CurrentUser`.
    pub auth: AuthState,
    /// Deadline for reads, creates and deletes.
    pub request_timeout: Duration,
    /// Deadline for updates.
    pub update_timeout: Duration,
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}

impl AppState {
    /// Wires a store and a cache into the cached repository and the auth state.
    pub(crate) fn assemble<S, C>(
        store: Arc<S>,
        cache: Arc<C>,
        sessions: Arc<dyn SessionRepository>,
        config: &Config,
        auth_config: AuthConfig,
    ) -> Self
    where
        S: TaskStore + UserRepository + 'static,
        C: Cache + 'static,
    {
        let repository = CachedTaskRepository::new(store.clone(), cache, config.cache_ttl())
            .with_fail_open(config.cache_fail_open);
        let metrics = repository.metrics();

        Self {
            tasks: Arc::new(repository),
            metrics,
            auth: AuthState::new(sessions, store, auth_config),
            request_timeout: config.request_timeout(),
            update_timeout: config.update_timeout(),
        }
    }

    /// Creates the state for the backends selected at compile time.
    pub async fn new(config: &Config, auth_config: AuthConfig) -> Result<Self, anyhow::Error> {
        let store = backends::open_store(config).await?;
        let cache = backends::open_cache(config).await?;
        let sessions = backends::open_sessions(config).await?;

        tracing::info!(
            storage = backends::STORAGE,
            cache = backends::CACHE,
            sessions = backends::SESSIONS,
            cache_ttl_seconds = config.cache_ttl_seconds,
            fail_open = config.cache_fail_open,
            "Backends ready"
        );

        Ok(Self::assemble(store, cache, sessions, config, auth_config))
    }

    /// Point-in-time copy of the cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.metrics.snapshot()
    }
}

// ============================================================================
// Factory functions for the feature-selected backends
// ============================================================================

mod backends {
    use super::*;

    #[cfg(feature = "inmemory")]
    pub const STORAGE: &str = "inmemory";
    #[cfg(feature = "sqlite")]
    pub const STORAGE: &str = "sqlite";

    #[cfg(feature = "memory")]
    pub const CACHE: &str = "memory";
    #[cfg(feature = "redis")]
    pub const CACHE: &str = "redis";

    #[cfg(feature = "auth-redis")]
    pub const SESSIONS: &str = "redis";
    #[cfg(not(feature = "auth-redis"))]
    pub const SESSIONS: &str = "inmemory";

    #[cfg(feature = "inmemory")]
    pub async fn open_store(
        _config: &Config,
    ) -> anyhow::Result<Arc<crate::storage::InMemoryRepository>> {
        Ok(Arc::new(crate::storage::InMemoryRepository::new()))
    }

    #[cfg(feature = "sqlite")]
    pub async fn open_store(
        config: &Config,
    ) -> anyhow::Result<Arc<crate::storage::SqliteRepository>> {
        let repo = crate::storage::SqliteRepository::new(&config.sqlite_path).await?;
        Ok(Arc::new(repo))
    }

    #[cfg(feature = "memory")]
    pub async fn open_cache(config: &Config) -> anyhow::Result<Arc<crate::cache::MemoryCache>> {
        Ok(Arc::new(crate::cache::MemoryCache::new(
            config.cache_max_entries,
        )))
    }

    #[cfg(feature = "redis")]
    pub async fn open_cache(config: &Config) -> anyhow::Result<Arc<crate::cache::RedisCache>> {
        Ok(Arc::new(crate::cache::RedisCache::new(&config.redis_url).await?))
    }

    #[cfg(not(feature = "auth-redis"))]
    pub async fn open_sessions(_config: &Config) -> anyhow::Result<Arc<dyn SessionRepository>> {
        Ok(Arc::new(tasktrack_auth::InMemorySessionStore::new()))
    }

    #[cfg(feature = "auth-redis")]
    pub async fn open_sessions(config: &Config) -> anyhow::Result<Arc<dyn SessionRepository>> {
        let store = tasktrack_auth::RedisSessionStore::connect(&config.redis_url, 4).await?;
        Ok(Arc::new(store))
    }
}

// ============================================================================
// Test support - provides Default implementation for unit tests
// ============================================================================

#[cfg(test)]
mod test_support {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// In-memory store, cache and sessions with the default configuration.
        pub fn for_tests(config: &Config) -> Self {
            Self::assemble(
                Arc::new(InMemoryRepository::new()),
                Arc::new(MemoryCache::new(config.cache_max_entries)),
                Arc::new(tasktrack_auth::InMemorySessionStore::new()),
                config,
                AuthConfig::default(),
            )
        }
    }

    impl Default for AppState {
        fn default() -> Self {
            Self::for_tests(&Config::default())
        }
    }
}
