use chrono::{DateTime, Utc};

use super::error::TaskError;
use super::requests::{NewTask, TaskPatch};
use super::types::Task;

/// Validates a create request.
pub fn validate_new_task(request: &NewTask) -> Result<(), TaskError> {
    if request.title.trim().is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    Ok(())
}

/// Validates an update request. A patch must change something, and a title
/// it sets must not be blank.
pub fn validate_patch(patch: &TaskPatch) -> Result<(), TaskError> {
    if patch.is_empty() {
        return Err(TaskError::EmptyPatch);
    }
    if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(TaskError::EmptyTitle);
    }
    Ok(())
}

/// Applies `patch` to `task`, returning true if any field changed.
///
/// `updated_at` is only touched when something changed, so a patch that
/// repeats the current values is a match without a modification.
pub fn apply_patch(task: &mut Task, patch: &TaskPatch, now: DateTime<Utc>) -> bool {
    let mut modified = false;

    if let Some(title) = patch.title.as_deref().map(str::trim) {
        if task.title != title {
            task.title = title.to_string();
            modified = true;
        }
    }
    if let Some(comment) = &patch.comment {
        if &task.comment != comment {
            task.comment.clone_from(comment);
            modified = true;
        }
    }
    if let Some(done) = patch.done {
        if task.done != done {
            task.done = done;
            modified = true;
        }
    }

    if modified {
        task.updated_at = now;
    }
    modified
}
