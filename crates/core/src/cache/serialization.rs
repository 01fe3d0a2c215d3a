//! Pure functions for serializing/deserializing tasks to/from cache bytes.
//!
//! Values are stored as JSON so they stay readable with `redis-cli`.

use thiserror::Error;

use crate::task::Task;

/// Errors that can occur during cache serialization/deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to serialize a value to bytes.
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    /// Failed to deserialize bytes to a value.
    #[error("Failed to deserialize: {0}")]
    DeserializeFailed(String),
}

/// Result type for serialization operations.
pub type Result<T> = std::result::Result<T, SerializationError>;

/// Serializes a task to JSON bytes.
pub fn serialize_task(task: &Task) -> Result<Vec<u8>> {
    serde_json::to_vec(task).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to a task.
pub fn deserialize_task(bytes: &[u8]) -> Result<Task> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

/// Serializes a task collection to a JSON array.
pub fn serialize_tasks(tasks: &[Task]) -> Result<Vec<u8>> {
    serde_json::to_vec(tasks).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes a JSON array to a task collection.
pub fn deserialize_tasks(bytes: &[u8]) -> Result<Vec<Task>> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::ObjectId;

    #[test]
    fn test_task_survives_cache_encoding() {
        let task = Task::new(ObjectId::new(), "buy milk").with_comment("2 liters");
        let bytes = serialize_task(&task).unwrap();
        assert_eq!(deserialize_task(&bytes).unwrap(), task);
    }

    #[test]
    fn test_empty_collection_is_cacheable() {
        let bytes = serialize_tasks(&[]).unwrap();
        assert_eq!(bytes, b"[]");
        assert!(deserialize_tasks(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_deserialize_garbage_fails() {
        let result = deserialize_tasks(b"not json");
        assert!(matches!(
            result,
            Err(SerializationError::DeserializeFailed(_))
        ));
    }

    #[test]
    fn test_deserialize_task_from_collection_bytes_fails() {
        let bytes = serialize_tasks(&[Task::new(ObjectId::new(), "x")]).unwrap();
        assert!(deserialize_task(&bytes).is_err());
    }
}
