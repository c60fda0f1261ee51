//! Contractual relational shape of the roster store.
//!
//! Table and column names here are shared by migrations, repositories and
//! the named-query registry. Repositories call [`ensure_schema_ready`] on
//! construction so they never run against a half-migrated connection.

use crate::db::migrations::{current_user_version, latest_version};
use crate::repo::{RepoError, RepoResult};
use rusqlite::Connection;

pub const STUDENTS_TABLE: &str = "students";
pub const CLASSES_TABLE: &str = "classes";
pub const CLASS_STUDENTS_TABLE: &str = "class_students";

/// Required columns per table.
pub const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (STUDENTS_TABLE, &["id", "first_name", "last_name"]),
    (CLASSES_TABLE, &["code", "name"]),
    (CLASS_STUDENTS_TABLE, &["seq", "class_code", "student_id"]),
];

/// Verifies schema version, tables and columns expected by repositories.
pub fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
