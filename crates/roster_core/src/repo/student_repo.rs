//! Student repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist and load `students` rows.
//! - Navigate student -> classes through `class_students`.
//!
//! # Invariants
//! - Related classes are returned in bridge insertion order (`seq ASC`).
//! - Removing a student deletes its bridge rows only, never the classes.

use crate::db::schema::ensure_schema_ready;
use crate::model::class::{Class, ClassCode};
use crate::model::enrollment::StudentWithClasses;
use crate::model::student::{NewStudent, Student, StudentId};
use crate::repo::class_repo::parse_class_row;
use crate::repo::error::{classify_sqlite_error, EntityKey, RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(crate) const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name
FROM students";

/// Repository interface for student persistence and navigation.
pub trait StudentRepository {
    /// Inserts one student and returns it with the store-assigned id.
    fn insert_student(&self, student: &NewStudent) -> RepoResult<Student>;
    /// Loads one student without its classes.
    fn find_student_by_id(&self, id: StudentId) -> RepoResult<Student>;
    /// Loads one student together with enrolled class codes.
    fn find_student_with_classes(&self, id: StudentId) -> RepoResult<StudentWithClasses>;
    /// Loads the classes a student is enrolled in, in enrollment order.
    fn load_student_classes(&self, id: StudentId) -> RepoResult<Vec<Class>>;
    /// Lists every student ordered by id.
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    /// Deletes one student and its enrollments.
    fn remove_student(&self, id: StudentId) -> RepoResult<()>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn insert_student(&self, student: &NewStudent) -> RepoResult<Student> {
        self.conn
            .execute(
                "INSERT INTO students (first_name, last_name) VALUES (?1, ?2);",
                params![student.first_name.as_str(), student.last_name.as_str()],
            )
            .map_err(|err| classify_sqlite_error(err, RepoError::ConstraintViolation))?;

        let id = self.conn.last_insert_rowid();
        debug!("event=student_insert module=repo status=ok student_id={id}");
        Ok(Student::from_new(id, student))
    }

    fn find_student_by_id(&self, id: StudentId) -> RepoResult<Student> {
        find_student(self.conn, id)?.ok_or(RepoError::NotFound(EntityKey::Student(id)))
    }

    fn find_student_with_classes(&self, id: StudentId) -> RepoResult<StudentWithClasses> {
        let student = self.find_student_by_id(id)?;
        let class_codes = load_class_codes(self.conn, id)?;
        Ok(StudentWithClasses {
            student,
            class_codes,
        })
    }

    fn load_student_classes(&self, id: StudentId) -> RepoResult<Vec<Class>> {
        if !student_exists(self.conn, id)? {
            return Err(RepoError::NotFound(EntityKey::Student(id)));
        }
        load_classes_for_student(self.conn, id)
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn remove_student(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityKey::Student(id)));
        }
        debug!("event=student_remove module=repo status=ok student_id={id}");
        Ok(())
    }
}

pub(crate) fn find_student(conn: &Connection, id: StudentId) -> RepoResult<Option<Student>> {
    let mut stmt = conn.prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_student_row(row)?));
    }
    Ok(None)
}

pub(crate) fn student_exists(conn: &Connection, id: StudentId) -> RepoResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM students WHERE id = ?1;", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// Joins student -> bridge -> classes in one statement, enrollment order.
pub(crate) fn load_classes_for_student(
    conn: &Connection,
    id: StudentId,
) -> RepoResult<Vec<Class>> {
    let mut stmt = conn.prepare(
        "SELECT
            c.code AS code,
            c.name AS name
         FROM students s
         INNER JOIN class_students cs ON cs.student_id = s.id
         INNER JOIN classes c ON c.code = cs.class_code
         WHERE s.id = ?1
         ORDER BY cs.seq ASC;",
    )?;
    let mut rows = stmt.query([id])?;
    let mut classes = Vec::new();
    while let Some(row) = rows.next()? {
        classes.push(parse_class_row(row)?);
    }
    Ok(classes)
}

fn load_class_codes(conn: &Connection, id: StudentId) -> RepoResult<Vec<ClassCode>> {
    let mut stmt = conn.prepare(
        "SELECT class_code
         FROM class_students
         WHERE student_id = ?1
         ORDER BY seq ASC;",
    )?;
    let mut rows = stmt.query([id])?;
    let mut codes = Vec::new();
    while let Some(row) = rows.next()? {
        codes.push(row.get(0)?);
    }
    Ok(codes)
}

pub(crate) fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let id: StudentId = row.get("id")?;
    let first_name: String = row.get("first_name")?;
    let last_name: String = row.get("last_name")?;
    if first_name.trim().is_empty() || last_name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank name on students.id {id}"
        )));
    }
    Ok(Student {
        id,
        first_name,
        last_name,
    })
}
