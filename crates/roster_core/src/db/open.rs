//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by roster behavior.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` (bridge rows cascade and
//!   dangling endpoints are rejected).
//! - Returned connections have migrations fully applied.

use super::config::{StoreConfig, StoreLocation, DEFAULT_BUSY_TIMEOUT_MS};
use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Performs connection bootstrap and migration checks.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_logged(
        "file",
        || Connection::open(path),
        Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
    )
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_logged(
        "memory",
        Connection::open_in_memory,
        Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
    )
}

/// Opens the store described by `config`.
pub fn open_with_config(config: &StoreConfig) -> DbResult<Connection> {
    match &config.location {
        StoreLocation::File { path } => {
            open_logged("file", || Connection::open(path), config.busy_timeout())
        }
        StoreLocation::Memory => {
            open_logged("memory", Connection::open_in_memory, config.busy_timeout())
        }
    }
}

fn open_logged(
    mode: &'static str,
    opener: impl FnOnce() -> rusqlite::Result<Connection>,
    busy_timeout: Duration,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match opener() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, busy_timeout) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection, busy_timeout: Duration) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    apply_migrations(conn)?;
    Ok(())
}
