use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Key/value cache used as a read accelerator in front of the task store.
///
/// `get` returns `Ok(None)` for an explicit miss. Any `Err` means the cache
/// could not answer and says nothing about whether the key exists.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value from the cache by key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
