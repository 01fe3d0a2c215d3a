use async_trait::async_trait;

use crate::task::{ObjectId, Task, TaskPatch};
use crate::user::User;

use super::{DeleteResult, Result, TaskFilter, UpdateResult};

/// Durable task collection queried by equality filters.
///
/// This is the source of truth. Implementations never consult a cache.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns every task matching `filter`, oldest first.
    async fn find(&self, filter: TaskFilter) -> Result<Vec<Task>>;

    /// Returns the first task matching `filter`, if any.
    async fn find_one(&self, filter: TaskFilter) -> Result<Option<Task>>;

    /// Inserts a new task. Fails with `AlreadyExists` if the id is taken.
    async fn insert_one(&self, task: &Task) -> Result<()>;

    /// Applies `patch` to the first task matching `filter`.
    async fn update_one(&self, filter: TaskFilter, patch: &TaskPatch) -> Result<UpdateResult>;

    /// Deletes the first task matching `filter`.
    async fn delete_one(&self, filter: TaskFilter) -> Result<DeleteResult>;
}

/// Owner-scoped task operations served to request handlers.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Gets every task owned by `owner_id`. An empty list is a valid result.
    async fn list_tasks(&self, owner_id: ObjectId) -> Result<Vec<Task>>;

    /// Gets a task by id. Tasks owned by someone else are `NotFound`.
    async fn get_task(&self, owner_id: ObjectId, id: ObjectId) -> Result<Task>;

    /// Creates a new task.
    async fn create_task(&self, task: &Task) -> Result<()>;

    /// Updates a task owned by `owner_id`. No match is `NotFound`.
    async fn update_task(
        &self,
        owner_id: ObjectId,
        id: ObjectId,
        patch: &TaskPatch,
    ) -> Result<UpdateResult>;

    /// Deletes a task owned by `owner_id`. No match is `NotFound`.
    async fn delete_task(&self, owner_id: ObjectId, id: ObjectId) -> Result<()>;
}

/// Repository for user operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets a user by their ID.
    async fn get_user(&self, id: ObjectId) -> Result<Option<User>>;

    /// Gets a user by their username.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Creates a new user. Fails with `AlreadyExists` if the username or
    /// email is taken.
    async fn create_user(&self, user: &User) -> Result<()>;
}
