//! Enrollment (bridge row) repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Insert and remove `class_students` rows.
//! - Report which endpoint is missing when a bridge row cannot be inserted.
//!
//! # Invariants
//! - Both endpoints must exist before a bridge row is inserted.
//! - A (class, student) pair is stored at most once; re-adding it fails with
//!   `DuplicateBridgeRow` instead of being ignored.
//! - `add_enrollments` inserts all rows in the given order or none of them.

use crate::db::schema::ensure_schema_ready;
use crate::model::student::StudentId;
use crate::repo::class_repo::class_exists;
use crate::repo::error::{classify_sqlite_error, EntityKey, RepoError, RepoResult};
use crate::repo::student_repo::student_exists;
use crate::repo::with_savepoint;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for enrollment bridge rows.
pub trait EnrollmentRepository {
    /// Enrolls one student in one class.
    fn add_enrollment(&self, class_code: &str, student_id: StudentId) -> RepoResult<()>;
    /// Enrolls several students in one class, preserving slice order.
    fn add_enrollments(&self, class_code: &str, student_ids: &[StudentId]) -> RepoResult<()>;
    /// Removes one enrollment.
    fn remove_enrollment(&self, class_code: &str, student_id: StudentId) -> RepoResult<()>;
    /// Returns whether the pair is enrolled.
    fn is_enrolled(&self, class_code: &str, student_id: StudentId) -> RepoResult<bool>;
}

/// SQLite-backed enrollment repository.
pub struct SqliteEnrollmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEnrollmentRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl EnrollmentRepository for SqliteEnrollmentRepository<'_> {
    fn add_enrollment(&self, class_code: &str, student_id: StudentId) -> RepoResult<()> {
        self.add_enrollments(class_code, &[student_id])
    }

    fn add_enrollments(&self, class_code: &str, student_ids: &[StudentId]) -> RepoResult<()> {
        with_savepoint(self.conn, "add_enrollments", || {
            if !class_exists(self.conn, class_code)? {
                return Err(RepoError::ReferentialIntegrityViolation {
                    missing: EntityKey::Class(class_code.to_string()),
                });
            }
            for &student_id in student_ids {
                insert_bridge_row(self.conn, class_code, student_id)?;
            }
            Ok(())
        })?;

        debug!(
            "event=enrollment_add module=repo status=ok class_code={} count={}",
            class_code,
            student_ids.len()
        );
        Ok(())
    }

    fn remove_enrollment(&self, class_code: &str, student_id: StudentId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM class_students WHERE class_code = ?1 AND student_id = ?2;",
            params![class_code, student_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityKey::Enrollment {
                class_code: class_code.to_string(),
                student_id,
            }));
        }
        debug!(
            "event=enrollment_remove module=repo status=ok class_code={class_code} student_id={student_id}"
        );
        Ok(())
    }

    fn is_enrolled(&self, class_code: &str, student_id: StudentId) -> RepoResult<bool> {
        bridge_row_exists(self.conn, class_code, student_id)
    }
}

fn insert_bridge_row(conn: &Connection, class_code: &str, student_id: StudentId) -> RepoResult<()> {
    if !student_exists(conn, student_id)? {
        return Err(RepoError::ReferentialIntegrityViolation {
            missing: EntityKey::Student(student_id),
        });
    }
    if bridge_row_exists(conn, class_code, student_id)? {
        return Err(duplicate_bridge_row(class_code, student_id));
    }

    conn.execute(
        "INSERT INTO class_students (class_code, student_id) VALUES (?1, ?2);",
        params![class_code, student_id],
    )
    .map_err(|err| classify_sqlite_error(err, |_| duplicate_bridge_row(class_code, student_id)))?;
    Ok(())
}

fn bridge_row_exists(conn: &Connection, class_code: &str, student_id: StudentId) -> RepoResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM class_students WHERE class_code = ?1 AND student_id = ?2;",
            params![class_code, student_id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn duplicate_bridge_row(class_code: &str, student_id: StudentId) -> RepoError {
    RepoError::DuplicateBridgeRow {
        class_code: class_code.to_string(),
        student_id,
    }
}
