//! SQLite error mapping.
//!
//! Maps `tokio_rusqlite::Error` and `rusqlite::Error` to `RepositoryError` from
//! `tasktrack_core::storage`. UNIQUE and PRIMARY KEY violations become
//! `AlreadyExists`; everything else is a connection or query failure.

use tasktrack_core::storage::RepositoryError;

fn is_duplicate(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || sqlite_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Maps a rusqlite error with a known ID to a RepositoryError.
fn map_rusqlite_error_with_id(
    err: &rusqlite::Error,
    entity_type: &'static str,
    id: &str,
) -> RepositoryError {
    match err {
        e if is_duplicate(e) => RepositoryError::AlreadyExists {
            entity_type,
            id: id.to_string(),
        },

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.code == rusqlite::ErrorCode::CannotOpen =>
        {
            RepositoryError::ConnectionFailed(format!("Cannot open database: {err}"))
        }

        rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
            entity_type,
            id: id.to_string(),
        },

        rusqlite::Error::FromSqlConversionFailure(..) => {
            RepositoryError::InvalidData(format!("Corrupt {entity_type} row: {err}"))
        }

        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

/// Maps a tokio_rusqlite error with a known ID to a RepositoryError.
///
/// This is the main entry point for error mapping in async code. `id` is
/// whatever identifies the entity at the call site (an object id, a
/// username, or a filter description).
pub fn map_tokio_rusqlite_error_with_id(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: impl Into<String>,
) -> RepositoryError {
    let id_str = id.into();
    match &err {
        tokio_rusqlite::Error::Rusqlite(rusqlite_err) => {
            map_rusqlite_error_with_id(rusqlite_err, entity_type, &id_str)
        }
        tokio_rusqlite::Error::ConnectionClosed | tokio_rusqlite::Error::Close(_) => {
            RepositoryError::ConnectionFailed("Connection closed unexpectedly".to_string())
        }
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ffi;

    fn constraint(extended_code: std::os::raw::c_int) -> tokio_rusqlite::Error {
        let sqlite_err = rusqlite::ffi::Error {
            code: rusqlite::ErrorCode::ConstraintViolation,
            extended_code,
        };
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(sqlite_err, None))
    }

    #[test]
    fn test_unique_constraint_maps_to_already_exists() {
        let result = map_tokio_rusqlite_error_with_id(
            constraint(ffi::SQLITE_CONSTRAINT_UNIQUE),
            "User",
            "alice",
        );

        assert_eq!(
            result,
            RepositoryError::AlreadyExists {
                entity_type: "User",
                id: "alice".to_string()
            }
        );
    }

    #[test]
    fn test_primary_key_maps_to_already_exists() {
        let result = map_tokio_rusqlite_error_with_id(
            constraint(ffi::SQLITE_CONSTRAINT_PRIMARYKEY),
            "Task",
            "abc",
        );

        assert!(matches!(
            result,
            RepositoryError::AlreadyExists {
                entity_type: "Task",
                ..
            }
        ));
    }

    #[test]
    fn test_no_rows_preserves_id() {
        let err = tokio_rusqlite::Error::Rusqlite(rusqlite::Error::QueryReturnedNoRows);

        let result = map_tokio_rusqlite_error_with_id(err, "Task", "abc-123");

        match result {
            RepositoryError::NotFound { entity_type, id } => {
                assert_eq!(entity_type, "Task");
                assert_eq!(id, "abc-123");
            }
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_connection_closed_maps_to_connection_failed() {
        let result =
            map_tokio_rusqlite_error_with_id(tokio_rusqlite::Error::ConnectionClosed, "Task", "x");

        assert!(matches!(result, RepositoryError::ConnectionFailed(_)));
    }

    #[test]
    fn test_other_error_maps_to_query_failed() {
        let err = tokio_rusqlite::Error::Other(Box::new(std::io::Error::other("test error")));

        let result = map_tokio_rusqlite_error_with_id(err, "User", "x");

        assert!(matches!(result, RepositoryError::QueryFailed(_)));
    }
}
