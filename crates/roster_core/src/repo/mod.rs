//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define roster data access contracts per table.
//! - Isolate SQLite query details from callers.
//!
//! # Invariants
//! - Repositories are only constructed over migrated connections.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateKey`, ...)
//!   in addition to DB transport errors.
//! - Repositories never begin or commit transactions; that belongs to the
//!   caller's unit of work.

pub mod class_repo;
pub mod enrollment_repo;
pub mod error;
pub mod student_repo;

pub use error::{EntityKey, RepoError, RepoResult};

use log::warn;
use rusqlite::Connection;

/// Runs `work` inside a named savepoint so a multi-row write applies fully or
/// not at all, whether or not the caller has a transaction open.
///
/// With no open transaction the savepoint is the transaction and `RELEASE`
/// commits it. Any failure, including a busy `RELEASE`, then rolls the whole
/// transaction back so the connection returns to autocommit.
pub(crate) fn with_savepoint<T>(
    conn: &Connection,
    name: &'static str,
    work: impl FnOnce() -> RepoResult<T>,
) -> RepoResult<T> {
    let owns_transaction = conn.is_autocommit();
    conn.execute_batch(&format!("SAVEPOINT {name};"))?;

    let outcome = work().and_then(|value| {
        conn.execute_batch(&format!("RELEASE {name};"))?;
        Ok(value)
    });

    if outcome.is_err() {
        let undo = if owns_transaction {
            "ROLLBACK;".to_string()
        } else {
            format!("ROLLBACK TO {name}; RELEASE {name};")
        };
        if let Err(undo_err) = conn.execute_batch(&undo) {
            warn!(
                "event=savepoint_rollback module=repo status=error savepoint={name} error={undo_err}"
            );
        }
    }
    outcome
}
