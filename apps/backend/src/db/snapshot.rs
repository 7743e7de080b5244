//! On-disk snapshot of the in-memory store.
//!
//! The snapshot is a complete SQLite file image. There is no journal: the
//! file on disk is always the whole store as of the last successful dump.

use rusqlite::backup::Progress;
use rusqlite::{Connection, DatabaseName};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::error::DbError;

type Result<T> = std::result::Result<T, DbError>;

/// The single snapshot file owned by the store.
///
/// Dumps are written to a sibling `.tmp` file and renamed over the snapshot,
/// so a crash mid-write leaves the previous image in place.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
    temp_path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut temp = path.clone().into_os_string();
        temp.push(".tmp");
        Self {
            path,
            temp_path: PathBuf::from(temp),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the snapshot into `conn`, replacing its contents.
    ///
    /// Returns `false` when no snapshot exists yet.
    pub fn restore_into(&self, conn: &mut Connection) -> Result<bool> {
        if !self.exists() {
            return Ok(false);
        }

        conn.restore(DatabaseName::Main, &self.path, None::<fn(Progress)>)
            .map_err(|e| {
                DbError::Snapshot(format!("restore from {}: {}", self.path.display(), e))
            })?;

        Ok(true)
    }

    /// Dump the entire store held by `conn` and replace the snapshot file.
    pub fn write_from(&self, conn: &Connection) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error("create directory", e))?;
            }
        }

        if self.temp_path.exists() {
            fs::remove_file(&self.temp_path).map_err(|e| self.io_error("remove stale temp", e))?;
        }

        conn.backup(DatabaseName::Main, &self.temp_path, None)
            .map_err(|e| {
                DbError::Snapshot(format!("dump to {}: {}", self.temp_path.display(), e))
            })?;

        fs::rename(&self.temp_path, &self.path).map_err(|e| self.io_error("rename", e))?;

        Ok(())
    }

    fn io_error(&self, step: &str, err: std::io::Error) -> DbError {
        DbError::Snapshot(format!("{} for {}: {}", step, self.path.display(), err))
    }
}
