//! Cached task repository decorator.
//!
//! Wraps a `TaskStore` with the cache-aside protocol and exposes the
//! owner-scoped `TaskRepository` operations used by the handlers.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use tasktrack_core::cache::{
    deserialize_task, deserialize_tasks, serialize_task, serialize_tasks, task_key, tasks_key,
    Cache, SerializationError,
};
use tasktrack_core::storage::{
    RepositoryError, Result, TaskFilter, TaskRepository, TaskStore, UpdateResult,
};
use tasktrack_core::task::{ObjectId, Task, TaskPatch};

use super::{CacheMetrics, ScopeLocks};

type Decode<T> = fn(&[u8]) -> std::result::Result<T, SerializationError>;
type Encode<T> = fn(&T) -> std::result::Result<Vec<u8>, SerializationError>;

/// Cached task repository decorator.
///
/// Reads go cache first. On a miss the reader takes the scope guard for the
/// key, re-checks the cache, and only then queries the store, so concurrent
/// misses on one key cost a single store query. Writes go to the store and
/// then delete the affected keys.
///
/// # Type Parameters
///
/// * `S` - The underlying task store
/// * `C` - The cache implementation
pub struct CachedTaskRepository<S, C>
where
    S: TaskStore,
    C: Cache,
{
    store: Arc<S>,
    cache: Arc<C>,
    locks: ScopeLocks,
    metrics: Arc<CacheMetrics>,
    ttl: Duration,
    fail_open: bool,
}

impl<S, C> CachedTaskRepository<S, C>
where
    S: TaskStore,
    C: Cache,
{
    /// Creates a new cached repository. Cache read errors fail the request.
    pub fn new(store: Arc<S>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            store,
            cache,
            locks: ScopeLocks::new(),
            metrics: Arc::new(CacheMetrics::new()),
            ttl,
            fail_open: false,
        }
    }

    /// Treat cache read errors as misses instead of failing the request.
    pub fn with_fail_open(mut self, fail_open: bool) -> Self {
        self.fail_open = fail_open;
        self
    }

    /// Shared handle to the read/write counters.
    pub fn metrics(&self) -> Arc<CacheMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Looks `key` up. `Ok(None)` covers explicit misses, undecodable
    /// bytes, and cache errors when failing open.
    async fn lookup<T>(&self, key: &str, decode: Decode<T>) -> Result<Option<T>> {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => match decode(&bytes) {
                Ok(value) => Ok(Some(value)),
                Err(err) => {
                    self.metrics.record_decode_failure();
                    tracing::warn!(key, error = %err, "Cached value could not be decoded");
                    Ok(None)
                }
            },
            Ok(None) => Ok(None),
            Err(err) if self.fail_open => {
                tracing::warn!(key, error = %err, "Cache read failed, serving from store");
                Ok(None)
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "Cache read failed");
                Err(RepositoryError::CacheUnavailable(err.to_string()))
            }
        }
    }

    /// Read-through for one key. `query` runs at most once and only while
    /// the scope guard for `key` is held. `None` results are not cached.
    async fn read_through<T, Q, F>(
        &self,
        key: &str,
        decode: Decode<T>,
        encode: Encode<T>,
        query: Q,
    ) -> Result<Option<T>>
    where
        Q: FnOnce() -> F,
        F: Future<Output = Result<Option<T>>>,
    {
        if let Some(value) = self.lookup(key, decode).await? {
            self.metrics.record_hit();
            tracing::trace!(key, "Cache hit");
            return Ok(Some(value));
        }
        self.metrics.record_miss();

        let _guard = self.locks.acquire(key).await;

        if let Some(value) = self.lookup(key, decode).await? {
            self.metrics.record_coalesced();
            tracing::trace!(key, "Cache populated while waiting");
            return Ok(Some(value));
        }

        tracing::trace!(key, "Cache miss");
        self.metrics.record_store_query();
        let value = query().await?;

        if let Some(ref v) = value {
            self.populate(key, encode(v)).await;
        }

        Ok(value)
    }

    async fn populate(&self, key: &str, bytes: std::result::Result<Vec<u8>, SerializationError>) {
        let result = match bytes {
            Ok(bytes) => self
                .cache
                .set(key, &bytes, Some(self.ttl))
                .await
                .map_err(|e| e.to_string()),
            Err(err) => Err(err.to_string()),
        };

        if let Err(error) = result {
            self.metrics.record_populate_failure();
            tracing::warn!(key, %error, "Failed to populate cache");
        }
    }

    /// Runs the deletes on their own task so that dropping the caller after
    /// the store accepted a mutation still clears the stale entries.
    async fn invalidate(&self, keys: Vec<String>)
    where
        C: 'static,
    {
        let cache = Arc::clone(&self.cache);
        let metrics = Arc::clone(&self.metrics);

        let handle = tokio::spawn(async move {
            for key in &keys {
                if let Err(err) = cache.delete(key).await {
                    metrics.record_invalidate_failure();
                    tracing::warn!(key = %key, error = %err, "Failed to invalidate cache");
                }
            }
        });

        if let Err(err) = handle.await {
            self.metrics.record_invalidate_failure();
            tracing::warn!(error = %err, "Cache invalidation task failed");
        }
    }

    /// Owner's task collection, oldest first.
    pub async fn fetch_collection(&self, owner_id: ObjectId) -> Result<Vec<Task>> {
        let key = tasks_key(owner_id);
        let tasks = self
            .read_through(
                &key,
                deserialize_tasks,
                |tasks: &Vec<Task>| serialize_tasks(tasks),
                || async move {
                    self.store
                        .find(TaskFilter::by_owner(owner_id))
                        .await
                        .map(Some)
                },
            )
            .await?;

        Ok(tasks.unwrap_or_default())
    }

    /// A single task, visible only to its owner.
    pub async fn fetch_by_id(&self, owner_id: ObjectId, id: ObjectId) -> Result<Task> {
        let key = task_key(id);
        let task = self
            .read_through(&key, deserialize_task, serialize_task, || async move {
                self.store.find_one(TaskFilter::default().with_id(id)).await
            })
            .await?;

        match task {
            Some(task) if task.is_owned_by(owner_id) => Ok(task),
            _ => Err(RepositoryError::task_not_found(id)),
        }
    }
}

#[async_trait]
impl<S, C> TaskRepository for CachedTaskRepository<S, C>
where
    S: TaskStore + 'static,
    C: Cache + 'static,
{
    async fn list_tasks(&self, owner_id: ObjectId) -> Result<Vec<Task>> {
        self.fetch_collection(owner_id).await
    }

    async fn get_task(&self, owner_id: ObjectId, id: ObjectId) -> Result<Task> {
        self.fetch_by_id(owner_id, id).await
    }

    async fn create_task(&self, task: &Task) -> Result<()> {
        self.store.insert_one(task).await?;

        self.invalidate(vec![tasks_key(task.owner_id)]).await;

        tracing::debug!(task_id = %task.id, owner_id = %task.owner_id, "Task created");
        Ok(())
    }

    async fn update_task(
        &self,
        owner_id: ObjectId,
        id: ObjectId,
        patch: &TaskPatch,
    ) -> Result<UpdateResult> {
        let result = self
            .store
            .update_one(TaskFilter::by_owner(owner_id).with_id(id), patch)
            .await?;

        if result.matched_count == 0 {
            return Err(RepositoryError::task_not_found(id));
        }

        self.invalidate(vec![tasks_key(owner_id), task_key(id)]).await;

        tracing::debug!(
            task_id = %id,
            %owner_id,
            modified = result.modified_count,
            "Task updated"
        );
        Ok(result)
    }

    async fn delete_task(&self, owner_id: ObjectId, id: ObjectId) -> Result<()> {
        let result = self
            .store
            .delete_one(TaskFilter::by_owner(owner_id).with_id(id))
            .await?;

        if result.deleted_count == 0 {
            return Err(RepositoryError::task_not_found(id));
        }

        self.invalidate(vec![tasks_key(owner_id), task_key(id)]).await;

        tracing::debug!(task_id = %id, %owner_id, "Task deleted");
        Ok(())
    }
}
