//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use tasktrack_core::storage::{
    DeleteResult, RepositoryError, Result, TaskFilter, TaskStore, UpdateResult, UserRepository,
};
use tasktrack_core::task::{apply_patch, ObjectId, Task, TaskPatch};
use tasktrack_core::user::User;

/// In-memory storage backend.
///
/// Tasks are kept in insertion order so `find` returns oldest first, like
/// the SQLite backend. Data is lost when the repository is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    tasks: Arc<RwLock<Vec<Task>>>,
    users: Arc<RwLock<HashMap<ObjectId, User>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryRepository {
    async fn find(&self, filter: TaskFilter) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| filter.matches(t)).cloned().collect())
    }

    async fn find_one(&self, filter: TaskFilter) -> Result<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().find(|t| filter.matches(t)).cloned())
    }

    async fn insert_one(&self, task: &Task) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Task",
                id: task.id.to_string(),
            });
        }
        tasks.push(task.clone());
        Ok(())
    }

    async fn update_one(&self, filter: TaskFilter, patch: &TaskPatch) -> Result<UpdateResult> {
        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks.iter_mut().find(|t| filter.matches(t)) else {
            return Ok(UpdateResult::default());
        };

        let modified = apply_patch(task, patch, Utc::now());
        Ok(UpdateResult {
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    async fn delete_one(&self, filter: TaskFilter) -> Result<DeleteResult> {
        let mut tasks = self.tasks.write().await;
        let Some(index) = tasks.iter().position(|t| filter.matches(t)) else {
            return Ok(DeleteResult::default());
        };

        tasks.remove(index);
        Ok(DeleteResult { deleted_count: 1 })
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: ObjectId) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(existing) = users
            .values()
            .find(|u| u.username == user.username || u.email == user.email)
        {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                id: existing.username.clone(),
            });
        }
        users.insert(user.id, user.clone());
        Ok(())
    }
}
