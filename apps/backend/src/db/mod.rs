//! In-memory relational store with snapshot durability.
//!
//! All tables live in one SQLite connection opened in memory. Every write
//! goes through [`Database::write`], which dumps the whole store to the
//! snapshot file before returning, so a caller only sees success once the
//! write is on disk.

pub mod error;
pub mod schema;
pub mod snapshot;

mod content;
mod events;
mod progress;
mod search_cache;
mod stats;
mod tokens;
mod users;

pub use error::DbError;
pub use snapshot::SnapshotFile;

use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use crate::models::NewUser;

pub type Result<T> = std::result::Result<T, DbError>;

/// The store handle. Construct once at startup and share it.
pub struct Database {
    conn: Mutex<Connection>,
    snapshot: Option<SnapshotFile>,
}

impl Database {
    /// Open a store with no snapshot file (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            snapshot: None,
        })
    }

    /// Open the store backed by the snapshot at `path`.
    ///
    /// An existing snapshot is loaded as-is. Without one, the schema starts
    /// empty and `bootstrap_admin` is inserted, which also writes the first
    /// snapshot.
    pub fn open(path: impl AsRef<Path>, bootstrap_admin: &NewUser) -> Result<Self> {
        let snapshot = SnapshotFile::new(path.as_ref());
        let mut conn = Connection::open_in_memory()?;
        let restored = snapshot.restore_into(&mut conn)?;
        Self::initialize(&conn)?;

        let db = Self {
            conn: Mutex::new(conn),
            snapshot: Some(snapshot),
        };

        if restored {
            tracing::info!("Loaded snapshot from {}", path.as_ref().display());
        } else {
            let admin = db.create_user(bootstrap_admin)?;
            tracing::info!(
                "No snapshot at {}, seeded bootstrap admin '{}'",
                path.as_ref().display(),
                admin.username
            );
        }

        Ok(db)
    }

    fn initialize(conn: &Connection) -> Result<()> {
        conn.execute_batch(schema::PRAGMAS)?;
        conn.execute_batch(schema::SCHEMA)?;
        Ok(())
    }

    /// Path of the snapshot file, if durability is enabled.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_ref().map(SnapshotFile::path)
    }

    /// Dump the whole store to the snapshot file now.
    ///
    /// Safe to call at any time; a store without a snapshot file is a no-op.
    pub fn snapshot_now(&self) -> Result<()> {
        let conn = self.lock()?;
        self.persist(&conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    fn persist(&self, conn: &Connection) -> Result<()> {
        match &self.snapshot {
            Some(snapshot) => snapshot.write_from(conn).map_err(|e| {
                tracing::error!("Snapshot write failed, recent writes are not durable: {}", e);
                e
            }),
            None => Ok(()),
        }
    }

    /// Run a read against the store.
    pub(crate) fn read<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Run a mutation, then snapshot the store before returning.
    pub(crate) fn write<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.lock()?;
        let out = f(&conn)?;
        self.persist(&conn)?;
        Ok(out)
    }
}

/// Decode a text column through `FromStr`.
pub(crate) fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Decode a JSON text column.
pub(crate) fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| DbError::InvalidData(e.to_string()))
}

pub(crate) fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
