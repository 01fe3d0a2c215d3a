mod error;
mod keys;
mod serialization;
mod stats;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{task_key, tasks_key, TASKS_KEY_PREFIX, TASK_KEY_PREFIX};
pub use serialization::{
    deserialize_task, deserialize_tasks, serialize_task, serialize_tasks, SerializationError,
};
pub use stats::CacheStats;
pub use traits::Cache;
