//! Content, content progress and terminal session repositories.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::users::ensure_user;
use super::{json_column, to_json, Database, DbError, Result};
use crate::models::{Content, ContentProgress, TerminalEntry, TerminalSession};

fn row_to_content(row: &Row<'_>) -> rusqlite::Result<Content> {
    Ok(Content {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        category: row.get(3)?,
        created_by: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn row_to_content_progress(row: &Row<'_>) -> rusqlite::Result<ContentProgress> {
    Ok(ContentProgress {
        user_id: row.get(0)?,
        content_id: row.get(1)?,
        completed: row.get(2)?,
        percent: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn row_to_terminal_session(row: &Row<'_>) -> rusqlite::Result<TerminalSession> {
    Ok(TerminalSession {
        id: row.get(0)?,
        user_id: row.get(1)?,
        content_id: row.get(2)?,
        transcript: json_column(row, 3)?,
        created_at: row.get(4)?,
    })
}

fn find_content(conn: &Connection, id: i64) -> Result<Option<Content>> {
    conn.query_row(
        "SELECT id, title, body, category, created_by, created_at FROM content WHERE id = ?1",
        params![id],
        row_to_content,
    )
    .optional()
    .map_err(Into::into)
}

fn ensure_content(conn: &Connection, id: i64) -> Result<()> {
    match find_content(conn, id)? {
        Some(_) => Ok(()),
        None => Err(DbError::NotFound(format!("content {}", id))),
    }
}

impl Database {
    // === Content Repository ===

    pub fn create_content(
        &self,
        title: &str,
        body: &str,
        category: Option<&str>,
        created_by: i64,
    ) -> Result<Content> {
        self.write(|conn| {
            conn.execute(
                "INSERT INTO content (title, body, category, created_by, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![title, body, category, created_by, Utc::now()],
            )?;
            let id = conn.last_insert_rowid();
            find_content(conn, id)?.ok_or_else(|| DbError::NotFound(format!("content {}", id)))
        })
    }

    pub fn get_content(&self, id: i64) -> Result<Option<Content>> {
        self.read(|conn| find_content(conn, id))
    }

    pub fn list_content(&self) -> Result<Vec<Content>> {
        self.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, body, category, created_by, created_at FROM content ORDER BY id",
            )?;
            let items = stmt
                .query_map([], row_to_content)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(items)
        })
    }

    /// Delete a content item together with everyone's progress on it.
    pub fn delete_content(&self, id: i64) -> Result<()> {
        self.write(|conn| {
            ensure_content(conn, id)?;
            let tx = conn.unchecked_transaction()?;
            tx.execute("DELETE FROM content_progress WHERE content_id = ?1", params![id])?;
            tx.execute("DELETE FROM content WHERE id = ?1", params![id])?;
            tx.commit()?;
            Ok(())
        })
    }

    // === Content Progress ===

    /// Upsert the (user, content) progress row.
    pub fn save_content_progress(
        &self,
        user_id: i64,
        content_id: i64,
        completed: bool,
        percent: u32,
    ) -> Result<ContentProgress> {
        self.write(|conn| {
            ensure_user(conn, user_id)?;
            ensure_content(conn, content_id)?;
            conn.execute(
                "INSERT INTO content_progress (user_id, content_id, completed, percent, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (user_id, content_id) DO UPDATE SET
                    completed = excluded.completed,
                    percent = excluded.percent,
                    updated_at = excluded.updated_at",
                params![user_id, content_id, completed, percent.min(100), Utc::now()],
            )?;
            conn.query_row(
                "SELECT user_id, content_id, completed, percent, updated_at
                 FROM content_progress WHERE user_id = ?1 AND content_id = ?2",
                params![user_id, content_id],
                row_to_content_progress,
            )
            .map_err(Into::into)
        })
    }

    pub fn list_content_progress(&self, user_id: i64) -> Result<Vec<ContentProgress>> {
        self.read(|conn| {
            ensure_user(conn, user_id)?;
            let mut stmt = conn.prepare(
                "SELECT user_id, content_id, completed, percent, updated_at
                 FROM content_progress WHERE user_id = ?1 ORDER BY content_id",
            )?;
            let rows = stmt
                .query_map(params![user_id], row_to_content_progress)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // === Terminal Sessions ===

    pub fn save_terminal_session(
        &self,
        user_id: i64,
        content_id: Option<i64>,
        transcript: &[TerminalEntry],
    ) -> Result<TerminalSession> {
        self.write(|conn| {
            ensure_user(conn, user_id)?;
            conn.execute(
                "INSERT INTO terminal_sessions (user_id, content_id, transcript, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, content_id, to_json(&transcript)?, Utc::now()],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                "SELECT id, user_id, content_id, transcript, created_at
                 FROM terminal_sessions WHERE id = ?1",
                params![id],
                row_to_terminal_session,
            )
            .map_err(Into::into)
        })
    }

    pub fn list_terminal_sessions(&self, user_id: i64) -> Result<Vec<TerminalSession>> {
        self.read(|conn| {
            ensure_user(conn, user_id)?;
            let mut stmt = conn.prepare(
                "SELECT id, user_id, content_id, transcript, created_at
                 FROM terminal_sessions WHERE user_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map(params![user_id], row_to_terminal_session)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}
