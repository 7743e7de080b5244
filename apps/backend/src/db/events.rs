//! Answer log and exam repositories. Both are append-only.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::users::ensure_user;
use super::{count, json_column, parse_column, to_json, Database, DbError, Result};
use crate::models::{AnswerEvent, AnswerMode, AnswerTotals, ExamRecord, StoredAnswer, StoredExam};

const ANSWER_COLUMNS: &str =
    "id, user_id, question_id, selected_index, is_correct, answered_at, mode, exam_id";

const EXAM_COLUMNS: &str = "id, user_id, started_at, finished_at, total_questions,
    correct_answers, score, answers, mode, time_limit_minutes, certification, created_at";

fn row_to_answer(row: &Row<'_>) -> rusqlite::Result<StoredAnswer> {
    Ok(StoredAnswer {
        id: row.get(0)?,
        user_id: row.get(1)?,
        question_id: row.get(2)?,
        selected_index: row.get(3)?,
        is_correct: row.get(4)?,
        timestamp: row.get(5)?,
        mode: parse_column(row, 6)?,
        exam_id: row.get(7)?,
    })
}

fn row_to_exam(row: &Row<'_>) -> rusqlite::Result<StoredExam> {
    Ok(StoredExam {
        id: row.get(0)?,
        user_id: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        total_questions: row.get(4)?,
        correct_answers: row.get(5)?,
        score: row.get(6)?,
        answers: json_column(row, 7)?,
        mode: row.get(8)?,
        time_limit_minutes: row.get(9)?,
        certification: row.get(10)?,
        created_at: row.get(11)?,
    })
}

fn find_exam(conn: &Connection, id: i64) -> Result<Option<StoredExam>> {
    let sql = format!("SELECT {} FROM exams WHERE id = ?1", EXAM_COLUMNS);
    conn.query_row(&sql, params![id], row_to_exam)
        .optional()
        .map_err(Into::into)
}

impl Database {
    // === Answer Log ===

    /// Append one answer. The progress rollup is not touched.
    pub fn record_answer(&self, user_id: i64, event: &AnswerEvent) -> Result<StoredAnswer> {
        self.write(|conn| {
            ensure_user(conn, user_id)?;
            conn.execute(
                "INSERT INTO user_answers (user_id, question_id, selected_index, is_correct,
                    answered_at, mode, exam_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    user_id,
                    event.question_id,
                    event.selected_index,
                    event.is_correct,
                    event.timestamp,
                    event.mode.as_str(),
                    event.exam_id,
                ],
            )?;

            Ok(StoredAnswer {
                id: conn.last_insert_rowid(),
                user_id,
                question_id: event.question_id.clone(),
                selected_index: event.selected_index,
                is_correct: event.is_correct,
                timestamp: event.timestamp,
                mode: event.mode,
                exam_id: event.exam_id,
            })
        })
    }

    /// A user's answers in insertion order, optionally filtered by mode.
    pub fn list_answers(
        &self,
        user_id: i64,
        mode: Option<AnswerMode>,
    ) -> Result<Vec<StoredAnswer>> {
        self.read(|conn| {
            ensure_user(conn, user_id)?;
            let answers = match mode {
                Some(mode) => {
                    let sql = format!(
                        "SELECT {} FROM user_answers WHERE user_id = ?1 AND mode = ?2 ORDER BY id",
                        ANSWER_COLUMNS
                    );
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt
                        .query_map(params![user_id, mode.as_str()], row_to_answer)?
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                    rows
                }
                None => {
                    let sql = format!(
                        "SELECT {} FROM user_answers WHERE user_id = ?1 ORDER BY id",
                        ANSWER_COLUMNS
                    );
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt
                        .query_map(params![user_id], row_to_answer)?
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                    rows
                }
            };
            Ok(answers)
        })
    }

    /// Answered/correct counts for one user, straight from the log.
    pub fn answer_totals(&self, user_id: i64) -> Result<AnswerTotals> {
        self.read(|conn| {
            ensure_user(conn, user_id)?;
            let (answered, correct): (i64, i64) = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(is_correct), 0)
                 FROM user_answers WHERE user_id = ?1",
                params![user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            Ok(AnswerTotals {
                answered: count(answered),
                correct: count(correct),
            })
        })
    }

    // === Exam Repository ===

    /// Store a closed exam run. Exams are never updated afterwards.
    pub fn record_exam(&self, user_id: i64, exam: &ExamRecord) -> Result<StoredExam> {
        self.write(|conn| {
            ensure_user(conn, user_id)?;
            conn.execute(
                "INSERT INTO exams (user_id, started_at, finished_at, total_questions,
                    correct_answers, score, answers, mode, time_limit_minutes, certification,
                    created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    user_id,
                    exam.started_at,
                    exam.finished_at,
                    exam.total_questions,
                    exam.correct_answers,
                    exam.score(),
                    to_json(&exam.answers)?,
                    exam.mode,
                    exam.time_limit_minutes,
                    exam.certification,
                    Utc::now(),
                ],
            )?;

            let id = conn.last_insert_rowid();
            find_exam(conn, id)?.ok_or_else(|| DbError::NotFound(format!("exam {}", id)))
        })
    }

    pub fn get_exam(&self, id: i64) -> Result<Option<StoredExam>> {
        self.read(|conn| find_exam(conn, id))
    }

    /// A user's exams, newest first.
    pub fn list_exams(&self, user_id: i64) -> Result<Vec<StoredExam>> {
        self.read(|conn| {
            ensure_user(conn, user_id)?;
            let sql = format!(
                "SELECT {} FROM exams WHERE user_id = ?1 ORDER BY id DESC",
                EXAM_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let exams = stmt
                .query_map(params![user_id], row_to_exam)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(exams)
        })
    }
}
