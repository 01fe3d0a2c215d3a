use thiserror::Error;

/// Errors that can occur when validating task payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("Task title cannot be empty")]
    EmptyTitle,
    #[error("Update must set at least one of title, comment or done")]
    EmptyPatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_error_display() {
        assert_eq!(TaskError::EmptyTitle.to_string(), "Task title cannot be empty");
        assert_eq!(
            TaskError::EmptyPatch.to_string(),
            "Update must set at least one of title, comment or done"
        );
    }
}
