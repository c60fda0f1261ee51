//! Core student/class roster persistence.
//!
//! Students and classes are independent entities related through the
//! `class_students` bridge table. This crate owns the schema, the
//! repositories that navigate the bridge in both directions, the named-query
//! registry and the unit-of-work boundary callers wrap writes in.

pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod uow;

pub use db::{open_db, open_db_in_memory, open_with_config, DbError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings};
pub use model::class::{Class, ClassCode};
pub use model::enrollment::{ClassWithStudents, StudentWithClasses};
pub use model::student::{NewStudent, Student, StudentId};
pub use query::{Entity, NamedQuery, NamedQueryRunner, QueryParams, QueryResult, QueryValue};
pub use repo::class_repo::{ClassRepository, SqliteClassRepository};
pub use repo::enrollment_repo::{EnrollmentRepository, SqliteEnrollmentRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentRepository};
pub use repo::{EntityKey, RepoError, RepoResult};
pub use uow::UnitOfWork;
