//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O. Task queries take their `WHERE` clause from
//! [`filter_clause`] so every `TaskFilter` maps to the same predicates.

use tasktrack_core::storage::TaskFilter;

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Tasks table, rowid keeps insertion order
CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    title TEXT NOT NULL,
    comment TEXT NOT NULL DEFAULT '',
    done INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_owner_id ON tasks(owner_id);
"#;

// User queries
pub const INSERT_USER: &str = r#"
INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const SELECT_USER_BY_ID: &str = r#"
SELECT id, username, email, password_hash, created_at, updated_at
FROM users
WHERE id = ?1
"#;

pub const SELECT_USER_BY_USERNAME: &str = r#"
SELECT id, username, email, password_hash, created_at, updated_at
FROM users
WHERE username = ?1
"#;

// Task queries
pub const INSERT_TASK: &str = r#"
INSERT INTO tasks (id, owner_id, title, comment, done, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub const SELECT_TASKS: &str = r#"
SELECT id, owner_id, title, comment, done, created_at, updated_at
FROM tasks
"#;

pub const UPDATE_TASK: &str = r#"
UPDATE tasks
SET title = ?2, comment = ?3, done = ?4, updated_at = ?5
WHERE id = ?1
"#;

pub const DELETE_TASK: &str = r#"
DELETE FROM tasks
WHERE id = ?1
"#;

/// Builds the `WHERE` clause and its positional parameters for a filter.
///
/// An empty filter matches every row.
pub fn filter_clause(filter: &TaskFilter) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut params = Vec::new();

    if let Some(id) = filter.id {
        params.push(id.to_hex());
        conditions.push(format!("id = ?{}", params.len()));
    }
    if let Some(owner_id) = filter.owner_id {
        params.push(owner_id.to_hex());
        conditions.push(format!("owner_id = ?{}", params.len()));
    }

    if conditions.is_empty() {
        ("WHERE 1 = 1".to_string(), params)
    } else {
        (format!("WHERE {}", conditions.join(" AND ")), params)
    }
}

/// Full select statement for a filter, oldest first, optionally limited to one row.
pub fn select_tasks(filter: &TaskFilter, first_only: bool) -> (String, Vec<String>) {
    let (clause, params) = filter_clause(filter);
    let limit = if first_only { " LIMIT 1" } else { "" };
    (
        format!("{SELECT_TASKS}{clause} ORDER BY rowid ASC{limit}"),
        params,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasktrack_core::task::ObjectId;

    #[test]
    fn test_create_tables_is_valid_sql() {
        assert!(CREATE_TABLES.contains("CREATE TABLE IF NOT EXISTS users"));
        assert!(CREATE_TABLES.contains("CREATE TABLE IF NOT EXISTS tasks"));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let (clause, params) = filter_clause(&TaskFilter::default());
        assert_eq!(clause, "WHERE 1 = 1");
        assert!(params.is_empty());
    }

    #[test]
    fn test_filter_clause_numbers_params_in_order() {
        let id = ObjectId::from_bytes([1; 12]);
        let owner = ObjectId::from_bytes([2; 12]);

        let (clause, params) = filter_clause(&TaskFilter::by_owner(owner).with_id(id));

        assert_eq!(clause, "WHERE id = ?1 AND owner_id = ?2");
        assert_eq!(params, vec![id.to_hex(), owner.to_hex()]);
    }

    #[test]
    fn test_select_first_only_adds_limit() {
        let (sql, _) = select_tasks(&TaskFilter::default(), true);
        assert!(sql.trim_end().ends_with("ORDER BY rowid ASC LIMIT 1"));

        let (sql, _) = select_tasks(&TaskFilter::default(), false);
        assert!(sql.trim_end().ends_with("ORDER BY rowid ASC"));
    }
}
