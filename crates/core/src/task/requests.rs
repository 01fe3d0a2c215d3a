//! API request types for task operations.

use serde::{Deserialize, Serialize};

use super::{ObjectId, Task};
use crate::serde_ext::deserialize_optional_string;

/// Request payload for creating a task. `done` always starts out `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub comment: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Builds the stored task for `owner_id`, assigning a fresh id.
    pub fn into_task(self, owner_id: ObjectId) -> Task {
        Task::new(owner_id, self.title.trim()).with_comment(self.comment.unwrap_or_default())
    }
}

/// Field-level update for a task. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

impl TaskPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn done(mut self, done: bool) -> Self {
        self.done = Some(done);
        self
    }

    /// Returns true if no field would be changed.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.comment.is_none() && self.done.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_comment_is_optional() {
        let request: NewTask = serde_json::from_str(r#"{"title":"buy milk"}"#).unwrap();
        assert_eq!(request, NewTask::new("buy milk"));
    }

    #[test]
    fn test_new_task_blank_comment_is_none() {
        let request: NewTask =
            serde_json::from_str(r#"{"title":"buy milk","comment":"  "}"#).unwrap();
        assert!(request.comment.is_none());
    }

    #[test]
    fn test_new_task_ignores_done() {
        let request: NewTask =
            serde_json::from_str(r#"{"title":"buy milk","done":true}"#).unwrap();
        let task = request.into_task(ObjectId::new());
        assert!(!task.done);
    }

    #[test]
    fn test_into_task_assigns_owner_and_comment() {
        let owner = ObjectId::new();
        let task = NewTask::new(" buy milk ")
            .with_comment("2 liters")
            .into_task(owner);

        assert_eq!(task.owner_id, owner);
        assert_eq!(task.title, "buy milk");
        assert_eq!(task.comment, "2 liters");
    }

    #[test]
    fn test_patch_keeps_explicit_false() {
        let patch: TaskPatch = serde_json::from_str(r#"{"done":false}"#).unwrap();
        assert_eq!(patch.done, Some(false));
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_patch_empty_object_is_empty() {
        let patch: TaskPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }
}
