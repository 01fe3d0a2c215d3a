//! Functional core for tasktrack.
//!
//! Pure domain types, cache key and serialization contracts, and the
//! repository/cache traits the server implements. Nothing in this crate
//! performs I/O.

#[cfg(feature = "auth")]
pub mod auth;
pub mod cache;
pub mod serde_ext;
pub mod storage;
pub mod task;
pub mod user;
