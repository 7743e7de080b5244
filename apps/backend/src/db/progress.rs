//! Study progress rollup repository.
//!
//! The rollup is last-writer-wins: `replace_progress` stores whatever the
//! client sent and reads return it verbatim.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::users::ensure_user;
use super::{json_column, to_json, Database, DbError, Result};
use crate::models::{ProgressDocument, StoredProgress};

const PROGRESS_COLUMNS: &str = "user_id, total_answered, total_correct, total_incorrect,
    questions_answered, marked_for_review, streak, last_study_date,
    category_progress, certification_progress, updated_at";

fn row_to_progress(row: &Row<'_>) -> rusqlite::Result<StoredProgress> {
    Ok(StoredProgress {
        user_id: row.get(0)?,
        document: ProgressDocument {
            total_answered: row.get(1)?,
            total_correct: row.get(2)?,
            total_incorrect: row.get(3)?,
            questions_answered: json_column(row, 4)?,
            marked_for_review: json_column(row, 5)?,
            streak: row.get(6)?,
            last_study_date: row.get(7)?,
            category_progress: json_column(row, 8)?,
            certification_progress: json_column(row, 9)?,
        },
        updated_at: row.get(10)?,
    })
}

fn find_progress(conn: &Connection, user_id: i64) -> Result<Option<StoredProgress>> {
    let sql = format!(
        "SELECT {} FROM study_progress WHERE user_id = ?1",
        PROGRESS_COLUMNS
    );
    conn.query_row(&sql, params![user_id], row_to_progress)
        .optional()
        .map_err(Into::into)
}

fn upsert_progress(conn: &Connection, user_id: i64, doc: &ProgressDocument) -> Result<()> {
    conn.execute(
        "INSERT INTO study_progress (user_id, total_answered, total_correct, total_incorrect,
            questions_answered, marked_for_review, streak, last_study_date,
            category_progress, certification_progress, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT (user_id) DO UPDATE SET
            total_answered = excluded.total_answered,
            total_correct = excluded.total_correct,
            total_incorrect = excluded.total_incorrect,
            questions_answered = excluded.questions_answered,
            marked_for_review = excluded.marked_for_review,
            streak = excluded.streak,
            last_study_date = excluded.last_study_date,
            category_progress = excluded.category_progress,
            certification_progress = excluded.certification_progress,
            updated_at = excluded.updated_at",
        params![
            user_id,
            doc.total_answered,
            doc.total_correct,
            doc.total_incorrect,
            to_json(&doc.questions_answered)?,
            to_json(&doc.marked_for_review)?,
            doc.streak,
            doc.last_study_date,
            to_json(&doc.category_progress)?,
            to_json(&doc.certification_progress)?,
            Utc::now(),
        ],
    )?;
    Ok(())
}

impl Database {
    // === Progress Repository ===

    /// Current rollup for `user_id`, creating an empty one on first read.
    pub fn get_progress(&self, user_id: i64) -> Result<StoredProgress> {
        if let Some(progress) = self.read(|conn| find_progress(conn, user_id))? {
            return Ok(progress);
        }

        self.write(|conn| {
            ensure_user(conn, user_id)?;
            conn.execute(
                "INSERT OR IGNORE INTO study_progress (user_id, updated_at) VALUES (?1, ?2)",
                params![user_id, Utc::now()],
            )?;
            find_progress(conn, user_id)?
                .ok_or_else(|| DbError::NotFound(format!("progress for user {}", user_id)))
        })
    }

    /// Overwrite the rollup wholesale. Fails only if the user does not exist.
    pub fn replace_progress(&self, user_id: i64, doc: &ProgressDocument) -> Result<StoredProgress> {
        self.write(|conn| {
            ensure_user(conn, user_id)?;
            upsert_progress(conn, user_id, doc)?;
            find_progress(conn, user_id)?
                .ok_or_else(|| DbError::NotFound(format!("progress for user {}", user_id)))
        })
    }
}
