//! Repository layer contracts and SQLite persistence implementations.
//!
//! # Responsibility
//! - Define record-level data access contracts for tasks and projects.
//! - Isolate SQLite/JSON column details from the engine and services.
//!
//! # Invariants
//! - Repositories perform no business validation.
//! - Read paths reject malformed persisted rows with `InvalidData` instead of
//!   masking them.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use rusqlite::Connection;
use thiserror::Error;

pub mod project_repo;
pub mod task_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Store-level failure.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("record store requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("invalid persisted record data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Rejects connections that did not go through `db::open_db*`.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
