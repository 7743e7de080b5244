//! Aggregate math for progress and admin dashboards.
//!
//! Every place that derives an accuracy percentage goes through [`accuracy`]
//! so the rounding and the zero guard stay identical.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `round(correct / answered * 100)`, defined as 0 when `answered` is 0.
///
/// Halves round up, matching the usual `Math.round` behavior on the client.
pub fn accuracy(correct: u64, answered: u64) -> u32 {
    if answered == 0 {
        return 0;
    }
    let pct = (correct.saturating_mul(200) + answered) / answered.saturating_mul(2);
    u32::try_from(pct).unwrap_or(u32::MAX)
}

/// Event count for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    /// Day key formatted as YYYY-MM-DD.
    pub date: String,
    pub count: u64,
}

/// Bucket event days into a trailing window ending at `today`.
///
/// All `days` keys are seeded with zero before folding, so the result has
/// exactly `days` entries, oldest first, with no gaps. Events outside the
/// window are ignored.
pub fn daily_buckets<I>(today: NaiveDate, days: u32, events: I) -> Vec<DailyCount>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut buckets: BTreeMap<NaiveDate, u64> = (0..days)
        .map(|offset| (today - Duration::days(i64::from(offset)), 0))
        .collect();

    for day in events {
        if let Some(count) = buckets.get_mut(&day) {
            *count += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(date, count)| DailyCount {
            date: date.format("%Y-%m-%d").to_string(),
            count,
        })
        .collect()
}

/// Per-user answer totals fed into the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTotals {
    pub user_id: i64,
    pub username: String,
    pub display_name: String,
    pub answered: u64,
    pub correct: u64,
}

/// Leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedUser {
    pub user_id: i64,
    pub username: String,
    pub display_name: String,
    pub answered: u64,
    pub correct: u64,
    pub accuracy: u32,
}

/// Order by correct answers, then answered, both descending, and keep `limit`.
///
/// Remaining ties fall back to ascending user id so the order is stable.
pub fn rank_users(mut totals: Vec<UserTotals>, limit: usize) -> Vec<RankedUser> {
    totals.sort_by(|a, b| {
        b.correct
            .cmp(&a.correct)
            .then(b.answered.cmp(&a.answered))
            .then(a.user_id.cmp(&b.user_id))
    });

    totals
        .into_iter()
        .take(limit)
        .map(|t| RankedUser {
            accuracy: accuracy(t.correct, t.answered),
            user_id: t.user_id,
            username: t.username,
            display_name: t.display_name,
            answered: t.answered,
            correct: t.correct,
        })
        .collect()
}
