//! SQLite repository implementation.
//!
//! Implements `TaskStore` and `UserRepository` from `tasktrack_core::storage`.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::params_from_iter;
use tokio_rusqlite::Connection;

use tasktrack_core::storage::{
    DeleteResult, RepositoryError, Result, TaskFilter, TaskStore, UpdateResult, UserRepository,
};
use tasktrack_core::task::{apply_patch, ObjectId, Task, TaskPatch};
use tasktrack_core::user::User;

use super::conversions::{format_datetime, row_to_task, row_to_user};
use super::error::map_tokio_rusqlite_error_with_id;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

fn describe(filter: &TaskFilter) -> String {
    match (filter.id, filter.owner_id) {
        (Some(id), _) => id.to_hex(),
        (None, Some(owner)) => format!("owner {owner}"),
        (None, None) => "*".to_string(),
    }
}

/// SQLite-based repository implementation.
///
/// A single connection serialises every statement, so `update_one` can read
/// and write a row inside one transaction without racing other writers.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    async fn select_tasks(&self, filter: TaskFilter, first_only: bool) -> Result<Vec<Task>> {
        let (sql, params) = schema::select_tasks(&filter, first_only);

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(wrap_err)?;
                let tasks = stmt
                    .query_map(params_from_iter(params.iter()), row_to_task)
                    .map_err(wrap_err)?
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(wrap_err)?;
                Ok(tasks)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Task", describe(&filter)))
    }
}

#[async_trait]
impl TaskStore for SqliteRepository {
    async fn find(&self, filter: TaskFilter) -> Result<Vec<Task>> {
        self.select_tasks(filter, false).await
    }

    async fn find_one(&self, filter: TaskFilter) -> Result<Option<Task>> {
        Ok(self.select_tasks(filter, true).await?.into_iter().next())
    }

    async fn insert_one(&self, task: &Task) -> Result<()> {
        let task = task.clone();
        let id = task.id.to_hex();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_TASK,
                    rusqlite::params![
                        task.id.to_hex(),
                        task.owner_id.to_hex(),
                        task.title,
                        task.comment,
                        task.done,
                        format_datetime(&task.created_at),
                        format_datetime(&task.updated_at),
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Task", id))
    }

    async fn update_one(&self, filter: TaskFilter, patch: &TaskPatch) -> Result<UpdateResult> {
        let (sql, params) = schema::select_tasks(&filter, true);
        let patch = patch.clone();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;

                let existing = {
                    let mut stmt = tx.prepare(&sql).map_err(wrap_err)?;
                    let mut rows = stmt
                        .query_map(params_from_iter(params.iter()), row_to_task)
                        .map_err(wrap_err)?;
                    rows.next().transpose().map_err(wrap_err)?
                };

                let Some(mut task) = existing else {
                    return Ok(UpdateResult::default());
                };

                let modified = apply_patch(&mut task, &patch, Utc::now());
                if modified {
                    tx.execute(
                        schema::UPDATE_TASK,
                        rusqlite::params![
                            task.id.to_hex(),
                            task.title,
                            task.comment,
                            task.done,
                            format_datetime(&task.updated_at),
                        ],
                    )
                    .map_err(wrap_err)?;
                }
                tx.commit().map_err(wrap_err)?;

                Ok(UpdateResult {
                    matched_count: 1,
                    modified_count: u64::from(modified),
                })
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Task", describe(&filter)))
    }

    async fn delete_one(&self, filter: TaskFilter) -> Result<DeleteResult> {
        let Some(task) = self.find_one(filter).await? else {
            return Ok(DeleteResult::default());
        };
        let id = task.id.to_hex();
        let id_for_err = id.clone();

        let deleted = self
            .conn
            .call(move |conn| {
                let rows = conn
                    .execute(schema::DELETE_TASK, rusqlite::params![id])
                    .map_err(wrap_err)?;
                Ok(rows)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Task", id_for_err))?;

        Ok(DeleteResult {
            deleted_count: deleted as u64,
        })
    }
}

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user(&self, id: ObjectId) -> Result<Option<User>> {
        let id_str = id.to_hex();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_USER_BY_ID)
                    .map_err(wrap_err)?;
                let result = stmt.query_row([&id_str], row_to_user);
                match result {
                    Ok(user) => Ok(Some(user)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", id.to_hex()))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let username = username.to_string();
        let username_for_err = username.clone();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_USER_BY_USERNAME)
                    .map_err(wrap_err)?;
                let result = stmt.query_row([&username], row_to_user);
                match result {
                    Ok(user) => Ok(Some(user)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", username_for_err))
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let user = user.clone();
        let username = user.username.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_USER,
                    rusqlite::params![
                        user.id.to_hex(),
                        user.username,
                        user.email,
                        user.password_hash,
                        format_datetime(&user.created_at),
                        format_datetime(&user.updated_at),
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "User", username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> SqliteRepository {
        SqliteRepository::new_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_find_by_owner_returns_oldest_first() {
        let repo = repo().await;
        let alice = ObjectId::new();
        let bob = ObjectId::new();

        let first = Task::new(alice, "first");
        let second = Task::new(alice, "second").with_comment("note");
        repo.insert_one(&first).await.unwrap();
        repo.insert_one(&Task::new(bob, "other")).await.unwrap();
        repo.insert_one(&second).await.unwrap();

        let tasks = repo.find(TaskFilter::by_owner(alice)).await.unwrap();

        assert_eq!(tasks, vec![first, second]);
    }

    #[tokio::test]
    async fn test_find_one_requires_owner_match() {
        let repo = repo().await;
        let owner = ObjectId::new();
        let task = Task::new(owner, "mine");
        repo.insert_one(&task).await.unwrap();

        let found = repo
            .find_one(TaskFilter::by_owner(owner).with_id(task.id))
            .await
            .unwrap();
        assert_eq!(found, Some(task.clone()));

        let stranger = repo
            .find_one(TaskFilter::by_owner(ObjectId::new()).with_id(task.id))
            .await
            .unwrap();
        assert!(stranger.is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_id_fails() {
        let repo = repo().await;
        let task = Task::new(ObjectId::new(), "once");
        repo.insert_one(&task).await.unwrap();

        let result = repo.insert_one(&task).await;

        assert!(matches!(
            result,
            Err(RepositoryError::AlreadyExists {
                entity_type: "Task",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_update_one_reports_counts() {
        let repo = repo().await;
        let owner = ObjectId::new();
        let task = Task::new(owner, "write tests");
        repo.insert_one(&task).await.unwrap();
        let filter = TaskFilter::by_owner(owner).with_id(task.id);

        let result = repo
            .update_one(filter, &TaskPatch::default().done(true))
            .await
            .unwrap();
        assert_eq!(
            result,
            UpdateResult {
                matched_count: 1,
                modified_count: 1
            }
        );

        let again = repo
            .update_one(filter, &TaskPatch::default().done(true))
            .await
            .unwrap();
        assert_eq!(
            again,
            UpdateResult {
                matched_count: 1,
                modified_count: 0
            }
        );

        let stored = repo.find_one(filter).await.unwrap().unwrap();
        assert!(stored.done);
        assert!(stored.updated_at >= task.updated_at);
    }

    #[tokio::test]
    async fn test_update_one_without_match() {
        let repo = repo().await;

        let result = repo
            .update_one(
                TaskFilter::by_owner(ObjectId::new()).with_id(ObjectId::new()),
                &TaskPatch::default().title("x"),
            )
            .await
            .unwrap();

        assert_eq!(result, UpdateResult::default());
    }

    #[tokio::test]
    async fn test_delete_one() {
        let repo = repo().await;
        let owner = ObjectId::new();
        let task = Task::new(owner, "doomed");
        repo.insert_one(&task).await.unwrap();

        let wrong_owner = repo
            .delete_one(TaskFilter::by_owner(ObjectId::new()).with_id(task.id))
            .await
            .unwrap();
        assert_eq!(wrong_owner.deleted_count, 0);

        let deleted = repo
            .delete_one(TaskFilter::by_owner(owner).with_id(task.id))
            .await
            .unwrap();
        assert_eq!(deleted.deleted_count, 1);
        assert!(repo.find(TaskFilter::by_owner(owner)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_roundtrip_and_uniqueness() {
        let repo = repo().await;
        let user = User::new("alice", "alice@example.com", "hash");
        repo.create_user(&user).await.unwrap();

        assert_eq!(repo.get_user(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(
            repo.get_user_by_username("alice").await.unwrap(),
            Some(user.clone())
        );
        assert!(repo.get_user_by_username("bob").await.unwrap().is_none());

        let clash = User::new("alice", "other@example.com", "hash");
        let result = repo.create_user(&clash).await;
        assert!(matches!(
            result,
            Err(RepositoryError::AlreadyExists {
                entity_type: "User",
                ..
            })
        ));
    }
}
