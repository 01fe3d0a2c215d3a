//! Cache key construction. Keys are always scoped to a single owner or a
//! single task so invalidation can delete exact keys.

use crate::task::ObjectId;

pub const TASKS_KEY_PREFIX: &str = "tasks:";
pub const TASK_KEY_PREFIX: &str = "task:";

/// Returns the cache key for an owner's task collection.
///
/// # Examples
///
/// ```
/// use tasktrack_core::cache::tasks_key;
/// use tasktrack_core::task::ObjectId;
///
/// let owner = ObjectId::parse_str("65f1c0de00112233445566aa").unwrap();
/// assert_eq!(tasks_key(owner), "tasks:65f1c0de00112233445566aa");
/// ```
pub fn tasks_key(owner_id: ObjectId) -> String {
    format!("{TASKS_KEY_PREFIX}{owner_id}")
}

/// Returns the cache key for a single task.
pub fn task_key(task_id: ObjectId) -> String {
    format!("{TASK_KEY_PREFIX}{task_id}")
}
