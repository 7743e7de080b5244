//! Admin dashboard aggregation over the answer log.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::db::{Database, Result};
use crate::models::AdminStatsResponse;
use quiz_core::{accuracy, daily_buckets, rank_users};

pub const ACTIVITY_WINDOW_DAYS: u32 = 7;
pub const TOP_USERS: usize = 10;

/// Read-only dashboard numbers as of `now`.
///
/// The activity window covers today and the six days before it (UTC), and
/// `activeUsers` counts users with at least one answer inside that window.
pub fn admin_stats(db: &Database, now: DateTime<Utc>) -> Result<AdminStatsResponse> {
    let today = now.date_naive();
    let first_day = today - Duration::days(i64::from(ACTIVITY_WINDOW_DAYS) - 1);
    let window_start = first_day.and_time(NaiveTime::MIN).and_utc();

    let totals = db.global_answer_totals()?;
    let recent = db.answer_times_since(window_start)?;
    let ranked: Vec<_> = db
        .per_user_totals()?
        .into_iter()
        .filter(|t| t.answered > 0)
        .collect();

    Ok(AdminStatsResponse {
        total_users: db.count_users()?,
        active_users: db.count_active_users(window_start)?,
        total_answers: totals.answered,
        correct_answers: totals.correct,
        global_accuracy: accuracy(totals.correct, totals.answered),
        top_users: rank_users(ranked, TOP_USERS),
        daily_activity: daily_buckets(
            today,
            ACTIVITY_WINDOW_DAYS,
            recent.into_iter().map(|t| t.date_naive()),
        ),
    })
}
