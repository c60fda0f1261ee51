//! Class repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist and load `classes` rows keyed by natural `code`.
//! - Navigate class -> students through `class_students`.
//!
//! # Invariants
//! - `code` is unique; a second insert fails with `DuplicateKey`.
//! - Related students are returned in bridge insertion order (`seq ASC`).
//! - Removing a class deletes its bridge rows only, never the students.

use crate::db::schema::ensure_schema_ready;
use crate::model::class::Class;
use crate::model::enrollment::ClassWithStudents;
use crate::model::student::{Student, StudentId};
use crate::repo::error::{classify_sqlite_error, EntityKey, RepoError, RepoResult};
use crate::repo::student_repo::parse_student_row;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(crate) const CLASS_SELECT_SQL: &str = "SELECT
    code,
    name
FROM classes";

/// Repository interface for class persistence and navigation.
pub trait ClassRepository {
    /// Inserts one class under its caller-assigned code.
    fn insert_class(&self, class: &Class) -> RepoResult<Class>;
    /// Loads one class by natural key without its students.
    fn find_class_by_code(&self, code: &str) -> RepoResult<Class>;
    /// Loads one class together with enrolled student ids.
    fn find_class_with_students(&self, code: &str) -> RepoResult<ClassWithStudents>;
    /// Loads enrolled students, in enrollment order.
    fn load_class_students(&self, code: &str) -> RepoResult<Vec<Student>>;
    /// Lists every class ordered by code.
    fn list_classes(&self) -> RepoResult<Vec<Class>>;
    /// Deletes one class and its enrollments.
    fn remove_class(&self, code: &str) -> RepoResult<()>;
}

/// SQLite-backed class repository.
pub struct SqliteClassRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClassRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ClassRepository for SqliteClassRepository<'_> {
    fn insert_class(&self, class: &Class) -> RepoResult<Class> {
        self.conn
            .execute(
                "INSERT INTO classes (code, name) VALUES (?1, ?2);",
                params![class.code.as_str(), class.name.as_str()],
            )
            .map_err(|err| {
                classify_sqlite_error(err, |_| {
                    RepoError::DuplicateKey(EntityKey::Class(class.code.clone()))
                })
            })?;

        debug!(
            "event=class_insert module=repo status=ok class_code={}",
            class.code
        );
        Ok(class.clone())
    }

    fn find_class_by_code(&self, code: &str) -> RepoResult<Class> {
        find_class(self.conn, code)?
            .ok_or_else(|| RepoError::NotFound(EntityKey::Class(code.to_string())))
    }

    fn find_class_with_students(&self, code: &str) -> RepoResult<ClassWithStudents> {
        let class = self.find_class_by_code(code)?;
        let student_ids = load_student_ids(self.conn, code)?;
        Ok(ClassWithStudents { class, student_ids })
    }

    fn load_class_students(&self, code: &str) -> RepoResult<Vec<Student>> {
        if !class_exists(self.conn, code)? {
            return Err(RepoError::NotFound(EntityKey::Class(code.to_string())));
        }
        load_students_for_class(self.conn, code)
    }

    fn list_classes(&self) -> RepoResult<Vec<Class>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLASS_SELECT_SQL} ORDER BY code ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut classes = Vec::new();
        while let Some(row) = rows.next()? {
            classes.push(parse_class_row(row)?);
        }
        Ok(classes)
    }

    fn remove_class(&self, code: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM classes WHERE code = ?1;", [code])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityKey::Class(code.to_string())));
        }
        debug!("event=class_remove module=repo status=ok class_code={code}");
        Ok(())
    }
}

pub(crate) fn find_class(conn: &Connection, code: &str) -> RepoResult<Option<Class>> {
    let mut stmt = conn.prepare(&format!("{CLASS_SELECT_SQL} WHERE code = ?1;"))?;
    let mut rows = stmt.query([code])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_class_row(row)?));
    }
    Ok(None)
}

pub(crate) fn class_exists(conn: &Connection, code: &str) -> RepoResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM classes WHERE code = ?1;", [code], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// Joins class -> bridge -> students in one statement, enrollment order.
pub(crate) fn load_students_for_class(conn: &Connection, code: &str) -> RepoResult<Vec<Student>> {
    let mut stmt = conn.prepare(
        "SELECT
            s.id AS id,
            s.first_name AS first_name,
            s.last_name AS last_name
         FROM classes c
         INNER JOIN class_students cs ON cs.class_code = c.code
         INNER JOIN students s ON s.id = cs.student_id
         WHERE c.code = ?1
         ORDER BY cs.seq ASC;",
    )?;
    let mut rows = stmt.query([code])?;
    let mut students = Vec::new();
    while let Some(row) = rows.next()? {
        students.push(parse_student_row(row)?);
    }
    Ok(students)
}

fn load_student_ids(conn: &Connection, code: &str) -> RepoResult<Vec<StudentId>> {
    let mut stmt = conn.prepare(
        "SELECT student_id
         FROM class_students
         WHERE class_code = ?1
         ORDER BY seq ASC;",
    )?;
    let mut rows = stmt.query([code])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}

pub(crate) fn parse_class_row(row: &Row<'_>) -> RepoResult<Class> {
    let code: String = row.get("code")?;
    let name: String = row.get("name")?;
    if code.trim().is_empty() {
        return Err(RepoError::InvalidData(
            "blank code in classes.code".to_string(),
        ));
    }
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank name on classes.code `{code}`"
        )));
    }
    Ok(Class { code, name })
}
