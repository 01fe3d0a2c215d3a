//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use tasktrack_core::task::{ObjectId, Task};
use tasktrack_core::user::User;

/// Convert a SQLite row to a Task.
///
/// Expected columns: id, owner_id, title, comment, done, created_at, updated_at
pub fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let id: String = row.get(0)?;
    let owner_id: String = row.get(1)?;
    let title: String = row.get(2)?;
    let comment: String = row.get(3)?;
    let done: bool = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(Task {
        id: parse_object_id(0, &id)?,
        owner_id: parse_object_id(1, &owner_id)?,
        title,
        comment,
        done,
        created_at: parse_datetime(5, &created_at)?,
        updated_at: parse_datetime(6, &updated_at)?,
    })
}

/// Convert a SQLite row to a User.
///
/// Expected columns: id, username, email, password_hash, created_at, updated_at
pub fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let username: String = row.get(1)?;
    let email: String = row.get(2)?;
    let password_hash: String = row.get(3)?;
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;

    Ok(User {
        id: parse_object_id(0, &id)?,
        username,
        email,
        password_hash,
        created_at: parse_datetime(4, &created_at)?,
        updated_at: parse_datetime(5, &updated_at)?,
    })
}

fn parse_object_id(column: usize, s: &str) -> rusqlite::Result<ObjectId> {
    ObjectId::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(column: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

/// Format a DateTime for SQLite storage (RFC 3339, sub-second precision kept).
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
