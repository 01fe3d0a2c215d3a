//! Storage backend implementations.
//!
//! This module provides concrete implementations of the store traits
//! defined in `tasktrack_core::storage`, plus the cache-aside decorator that
//! sits in front of them. The backend is selected at compile time via
//! feature flags (see `state.rs` for the mutual-exclusion checks).
//!
//! # Feature Flags
//!
//! - `inmemory` (default): process-local storage, lost on restart
//! - `sqlite`: SQLite storage backend using `rusqlite` and `tokio-rusqlite`
//!
//! # Examples
//!
//! Build with SQLite:
//! ```bash
//! cargo build -p tasktrack --no-default-features --features sqlite,memory
//! ```

pub mod cached;

// The in-memory store also backs the router tests, whatever the backend.
#[cfg(any(feature = "inmemory", test))]
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "inmemory", test))]
#[allow(unused_imports)]
pub use inmemory::InMemoryRepository;

#[cfg(feature = "sqlite")]
#[allow(unused_imports)]
pub use sqlite::SqliteRepository;
