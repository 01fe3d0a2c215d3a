//! In-memory storage backend.
//!
//! Stores tasks and users behind `Arc<RwLock<_>>`. Used as the default
//! backend and by tests that need no external services.

mod repository;

pub use repository::InMemoryRepository;
