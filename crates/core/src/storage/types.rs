use serde::{Deserialize, Serialize};

use crate::task::{ObjectId, Task};

/// Equality filter over the task collection. Unset fields match anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub id: Option<ObjectId>,
    pub owner_id: Option<ObjectId>,
}

impl TaskFilter {
    /// Matches every task owned by `owner_id`.
    pub fn by_owner(owner_id: ObjectId) -> Self {
        Self {
            id: None,
            owner_id: Some(owner_id),
        }
    }

    /// Narrows the filter to a single task id.
    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns true if `task` satisfies every set predicate.
    pub fn matches(&self, task: &Task) -> bool {
        self.id.is_none_or(|id| task.id == id)
            && self.owner_id.is_none_or(|owner| task.owner_id == owner)
    }
}

/// Outcome of a single-document update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Outcome of a single-document delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_matches_everything() {
        let task = Task::new(ObjectId::new(), "x");
        assert!(TaskFilter::default().matches(&task));
    }

    #[test]
    fn test_owner_filter() {
        let owner = ObjectId::new();
        let filter = TaskFilter::by_owner(owner);

        assert!(filter.matches(&Task::new(owner, "mine")));
        assert!(!filter.matches(&Task::new(ObjectId::new(), "theirs")));
    }

    #[test]
    fn test_id_and_owner_filter_requires_both() {
        let owner = ObjectId::new();
        let task = Task::new(owner, "x");

        assert!(TaskFilter::by_owner(owner).with_id(task.id).matches(&task));
        assert!(!TaskFilter::by_owner(ObjectId::new())
            .with_id(task.id)
            .matches(&task));
        assert!(!TaskFilter::by_owner(owner)
            .with_id(ObjectId::new())
            .matches(&task));
    }

    #[test]
    fn test_update_result_json_shape() {
        let result = UpdateResult {
            matched_count: 1,
            modified_count: 0,
        };
        assert_eq!(
            serde_json::to_value(result).unwrap(),
            serde_json::json!({"matchedCount": 1, "modifiedCount": 0})
        );
    }
}
