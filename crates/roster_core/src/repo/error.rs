//! Repository error taxonomy and SQLite failure classification.
//!
//! # Invariants
//! - Store failures are classified by SQLite extended result code, never by
//!   parsing message text.
//! - Every variant is surfaced to callers; nothing is swallowed or retried.

use crate::db::DbError;
use crate::model::class::ClassCode;
use crate::model::student::StudentId;
use rusqlite::ffi;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Identity of the row a repository error is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKey {
    Student(StudentId),
    Class(ClassCode),
    Enrollment {
        class_code: ClassCode,
        student_id: StudentId,
    },
    /// Single-result named query that matched no row.
    Query(&'static str),
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Student(id) => write!(f, "student {id}"),
            Self::Class(code) => write!(f, "class `{code}`"),
            Self::Enrollment {
                class_code,
                student_id,
            } => write!(f, "enrollment of student {student_id} in class `{class_code}`"),
            Self::Query(name) => write!(f, "result of query `{name}`"),
        }
    }
}

/// Errors from roster repositories, named queries and units of work.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error with no more specific meaning.
    Db(DbError),
    /// Lookup by key found zero rows.
    NotFound(EntityKey),
    /// Unique-constraint violation on entity insert.
    DuplicateKey(EntityKey),
    /// Bridge insert referenced an endpoint that does not exist.
    ReferentialIntegrityViolation { missing: EntityKey },
    /// The (class, student) pair is already enrolled.
    DuplicateBridgeRow {
        class_code: ClassCode,
        student_id: StudentId,
    },
    UnknownQueryName(String),
    MissingParameter {
        query: &'static str,
        parameter: &'static str,
    },
    /// Parameter present with a value of the wrong type.
    InvalidParameter {
        query: &'static str,
        parameter: &'static str,
        expected: &'static str,
    },
    /// Single-result query returned more than one row.
    MultipleResults { query: &'static str, count: usize },
    TransactionAlreadyActive,
    NoActiveTransaction,
    /// Catch-all store rejection (NOT NULL, CHECK, ...).
    ConstraintViolation(String),
    /// Lock wait exceeded the configured busy timeout.
    StoreTimeout(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid entity.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(key) => write!(f, "not found: {key}"),
            Self::DuplicateKey(key) => write!(f, "duplicate key: {key} already exists"),
            Self::ReferentialIntegrityViolation { missing } => {
                write!(f, "referential integrity violation: {missing} does not exist")
            }
            Self::DuplicateBridgeRow {
                class_code,
                student_id,
            } => write!(
                f,
                "student {student_id} is already enrolled in class `{class_code}`"
            ),
            Self::UnknownQueryName(name) => write!(f, "unknown named query `{name}`"),
            Self::MissingParameter { query, parameter } => {
                write!(f, "query `{query}` requires parameter `{parameter}`")
            }
            Self::InvalidParameter {
                query,
                parameter,
                expected,
            } => write!(
                f,
                "query `{query}` expects parameter `{parameter}` to be {expected}"
            ),
            Self::MultipleResults { query, count } => write!(
                f,
                "query `{query}` expected a single result, got {count} rows"
            ),
            Self::TransactionAlreadyActive => write!(f, "a transaction is already active"),
            Self::NoActiveTransaction => write!(f, "no transaction is active"),
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::StoreTimeout(message) => write!(f, "store timeout: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "roster repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "roster repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "roster repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted roster data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        classify_sqlite_error(value, Self::ConstraintViolation)
    }
}

/// Maps a failed write, routing unique/primary-key violations to `on_duplicate`.
///
/// Busy/locked failures become `StoreTimeout`; any other constraint failure
/// becomes `ConstraintViolation`.
pub(crate) fn classify_sqlite_error(
    err: rusqlite::Error,
    on_duplicate: impl FnOnce(String) -> RepoError,
) -> RepoError {
    if let rusqlite::Error::SqliteFailure(code, message) = &err {
        let message = message.clone().unwrap_or_else(|| code.to_string());
        match code.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                return RepoError::StoreTimeout(message);
            }
            ErrorCode::ConstraintViolation => {
                return match code.extended_code {
                    ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
                        on_duplicate(message)
                    }
                    _ => RepoError::ConstraintViolation(message),
                };
            }
            _ => {}
        }
    }
    RepoError::Db(DbError::Sqlite(err))
}
