//! Cache-aside decorator for the task store.
//!
//! - **Reads**: check the cache, on miss take the per-key scope guard,
//!   re-check, then query the store and populate the cache
//! - **Writes**: persist to the store, then delete every affected key
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let store = Arc::new(SqliteRepository::new("tasktrack.db").await?);
//! let cache = Arc::new(MemoryCache::new(10_000));
//!
//! let tasks = CachedTaskRepository::new(store, cache, Duration::from_secs(600));
//! let stats = tasks.metrics();
//! ```

mod metrics;
mod scope_locks;
mod task;

pub use metrics::CacheMetrics;
pub use scope_locks::ScopeLocks;
pub use task::CachedTaskRepository;
