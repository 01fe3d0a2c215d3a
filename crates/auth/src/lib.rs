//! Session authentication for tasktrack.
//!
//! This crate provides:
//! - Username/password signup and signin issuing opaque session tokens
//! - Session storage (in-memory, or Redis via the `redis` feature)
//! - An Axum extractor resolving the `Authorization` header into a user

mod config;
mod error;
mod extractors;
mod handlers;
mod sessions;
mod state;
#[cfg(test)]
mod test_support;

pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::CurrentUser;
pub use handlers::auth_routes;
pub use sessions::InMemorySessionStore;
#[cfg(feature = "redis")]
pub use sessions::RedisSessionStore;
pub use state::AuthState;
