//! Core quiz library shared by the backend service.
//!
//! Provides:
//! - Typed progress rollup documents (per-category and per-certification tallies)
//! - Answer and exam event types
//! - Search query normalization and validation
//! - Analytics math (accuracy, zero-filled daily buckets, top-N ranking)

pub mod analytics;
pub mod error;
pub mod query;
pub mod types;

pub use analytics::{accuracy, daily_buckets, rank_users, DailyCount, RankedUser, UserTotals};
pub use error::{Result, ValidationError};
pub use query::{normalize_query, NormalizedQuery, MIN_QUERY_LEN};
pub use types::{
    AnswerEvent, AnswerMode, ExamAnswer, ExamRecord, ProgressDocument, Role, Tally,
};
