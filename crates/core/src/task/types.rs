use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ObjectId;

/// A task owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: ObjectId,
    /// The user the task belongs to. Collections are scoped by this field.
    pub owner_id: ObjectId,
    pub title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new, not yet completed task for `owner_id`.
    pub fn new(owner_id: ObjectId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            owner_id,
            title: title.into(),
            comment: String::new(),
            done: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }

    /// Sets a specific ID for this task (useful for testing).
    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = id;
        self
    }

    /// Returns true if the task belongs to `owner_id`.
    pub fn is_owned_by(&self, owner_id: ObjectId) -> bool {
        self.owner_id == owner_id
    }
}
