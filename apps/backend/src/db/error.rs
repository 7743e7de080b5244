//! Store error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    Conflict(String),

    #[error("token is invalid or expired")]
    InvalidToken,

    #[error("snapshot failed: {0}")]
    Snapshot(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("store lock poisoned")]
    Poisoned,
}

impl DbError {
    /// Classify a unique-constraint violation as `Conflict`, anything else stays `Sqlite`.
    pub fn unique_or(err: rusqlite::Error, what: impl Into<String>) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Self::Conflict(what.into())
            }
            _ => Self::Sqlite(err),
        }
    }
}
