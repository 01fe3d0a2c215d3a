//! Task CRUD handlers.
//!
//! Every handler resolves the caller through `CurrentUser` and runs the
//! repository call under a per-request deadline. Caching is handled by the
//! repository decorator.

use std::future::Future;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use tasktrack_auth::CurrentUser;
use tasktrack_core::storage::{RepositoryError, UpdateResult};
use tasktrack_core::task::{validate_new_task, validate_patch, NewTask, ObjectId, Task, TaskPatch};

use crate::{handlers::AppError, state::AppState};

/// Plain acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of a successful update.
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub message: String,
    #[serde(flatten)]
    pub result: UpdateResult,
}

/// Runs `operation`, dropping it once `deadline` has passed.
async fn with_deadline<T, F>(deadline: Duration, operation: F) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    tokio::time::timeout(deadline, operation)
        .await
        .map_err(|_| RepositoryError::Timeout(deadline))?
}

/// List the caller's tasks (GET /tasks).
pub async fn list_tasks(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = with_deadline(state.request_timeout, state.tasks.list_tasks(user.id)).await?;
    Ok(Json(tasks))
}

/// Create a task for the caller (POST /tasks/create).
pub async fn create_task(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let Json(request) = payload?;
    validate_new_task(&request)?;

    let task = request.into_task(user.id);
    with_deadline(state.request_timeout, state.tasks.create_task(&task)).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Update one of the caller's tasks (PUT /tasks/update/{id}).
pub async fn update_task(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<UpdateResponse>, AppError> {
    let id = ObjectId::parse_str(&id)?;
    let Json(patch) = payload?;
    validate_patch(&patch)?;

    let result = with_deadline(
        state.update_timeout,
        state.tasks.update_task(user.id, id, &patch),
    )
    .await?;

    Ok(Json(UpdateResponse {
        message: "1 record updated".to_string(),
        result,
    }))
}

/// Delete one of the caller's tasks (DELETE /tasks/delete/{id}).
pub async fn delete_task(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = ObjectId::parse_str(&id)?;

    with_deadline(state.request_timeout, state.tasks.delete_task(user.id, id)).await?;

    Ok(Json(MessageResponse {
        message: format!("task with id {id} deleted"),
    }))
}

/// Fetch one of the caller's tasks (GET /tasks/search/{id}).
pub async fn search_task(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    let id = ObjectId::parse_str(&id)?;

    let task = with_deadline(state.request_timeout, state.tasks.get_task(user.id, id)).await?;
    Ok(Json(task))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_passes_result_through() {
        let result = with_deadline(Duration::from_secs(1), async { Ok::<_, RepositoryError>(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_deadline_elapsed_is_timeout() {
        let deadline = Duration::from_millis(10);
        let result = with_deadline(deadline, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, RepositoryError>(())
        })
        .await;

        assert_eq!(result, Err(RepositoryError::Timeout(deadline)));
    }
}
