//! Read-only aggregate queries for the admin dashboard.

use chrono::{DateTime, Utc};
use rusqlite::params;

use super::{count, Database, Result};
use crate::models::AnswerTotals;
use quiz_core::UserTotals;

impl Database {
    // === Stats Repository ===

    pub fn count_users(&self) -> Result<u64> {
        self.read(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(count(n))
        })
    }

    /// Answered/correct counts across the whole log.
    pub fn global_answer_totals(&self) -> Result<AnswerTotals> {
        self.read(|conn| {
            let (answered, correct): (i64, i64) = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(is_correct), 0) FROM user_answers",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            Ok(AnswerTotals {
                answered: count(answered),
                correct: count(correct),
            })
        })
    }

    /// Distinct users with at least one answer at or after `since`.
    pub fn count_active_users(&self, since: DateTime<Utc>) -> Result<u64> {
        self.read(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(DISTINCT user_id) FROM user_answers WHERE answered_at >= ?1",
                params![since],
                |row| row.get(0),
            )?;
            Ok(count(n))
        })
    }

    /// Timestamps of every answer at or after `since`.
    pub fn answer_times_since(&self, since: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>> {
        self.read(|conn| {
            let mut stmt =
                conn.prepare("SELECT answered_at FROM user_answers WHERE answered_at >= ?1")?;
            let times = stmt
                .query_map(params![since], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(times)
        })
    }

    /// Log-derived totals for every user, including users with no answers.
    pub fn per_user_totals(&self) -> Result<Vec<UserTotals>> {
        self.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.username, u.display_name,
                        COUNT(a.id), COALESCE(SUM(a.is_correct), 0)
                 FROM users u
                 LEFT JOIN user_answers a ON a.user_id = u.id
                 GROUP BY u.id
                 ORDER BY u.id",
            )?;
            let totals = stmt
                .query_map([], |row| {
                    Ok(UserTotals {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                        display_name: row.get(2)?,
                        answered: count(row.get(3)?),
                        correct: count(row.get(4)?),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(totals)
        })
    }
}
