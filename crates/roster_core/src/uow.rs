//! Unit-of-work boundary over one SQLite connection.
//!
//! # Responsibility
//! - Begin, commit and roll back one transaction per unit of work.
//! - Refuse nested transactions instead of silently joining them.
//!
//! # Invariants
//! - Writes issued between `begin()` and `commit()` become visible together.
//! - Repository failures never roll back implicitly; the caller decides.
//! - Dropping a unit of work with an open transaction rolls it back.

use crate::repo::{RepoError, RepoResult};
use log::{debug, warn};
use rusqlite::Connection;

/// Explicit transaction boundary handed to repository callers.
///
/// Repositories are built from [`UnitOfWork::conn`], so they share the
/// connection without borrowing the unit of work itself.
pub struct UnitOfWork<'conn> {
    conn: &'conn Connection,
    active: bool,
}

impl<'conn> UnitOfWork<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            active: false,
        }
    }

    /// Connection used by repositories inside this unit of work.
    pub fn conn(&self) -> &'conn Connection {
        self.conn
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Starts the transaction.
    ///
    /// Fails with `TransactionAlreadyActive` when this unit of work, or any
    /// other holder of the connection, already has a transaction open.
    pub fn begin(&mut self) -> RepoResult<()> {
        if self.active || !self.conn.is_autocommit() {
            return Err(RepoError::TransactionAlreadyActive);
        }
        self.conn.execute_batch("BEGIN IMMEDIATE;")?;
        self.active = true;
        debug!("event=uow_begin module=uow status=ok");
        Ok(())
    }

    /// Makes every write since `begin()` visible.
    pub fn commit(&mut self) -> RepoResult<()> {
        if !self.active {
            return Err(RepoError::NoActiveTransaction);
        }
        self.conn.execute_batch("COMMIT;")?;
        self.active = false;
        debug!("event=uow_commit module=uow status=ok");
        Ok(())
    }

    /// Discards every write since `begin()`.
    pub fn rollback(&mut self) -> RepoResult<()> {
        if !self.active {
            return Err(RepoError::NoActiveTransaction);
        }
        self.conn.execute_batch("ROLLBACK;")?;
        self.active = false;
        debug!("event=uow_rollback module=uow status=ok");
        Ok(())
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        warn!("event=uow_abort module=uow status=start reason=dropped_without_commit");
        if let Err(err) = self.conn.execute_batch("ROLLBACK;") {
            warn!("event=uow_abort module=uow status=error error={err}");
        }
    }
}
