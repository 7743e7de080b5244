//! Store entities and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Re-export shared types from quiz-core
pub use quiz_core::types::{
    AnswerEvent, AnswerMode, ExamAnswer, ExamRecord, ProgressDocument, Role, Tally,
};
pub use quiz_core::{DailyCount, RankedUser};

// === Store Entity Types ===

/// Account row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Public view without the credential hash.
    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            created_at: self.created_at,
            last_login: self.last_login,
        }
    }
}

/// Fields needed to insert a user. `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: Role,
}

/// Rollup row with its last write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProgress {
    pub user_id: i64,
    #[serde(flatten)]
    pub document: ProgressDocument,
    pub updated_at: DateTime<Utc>,
}

/// Answer log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnswer {
    pub id: i64,
    pub user_id: i64,
    pub question_id: String,
    pub selected_index: u32,
    pub is_correct: bool,
    pub timestamp: DateTime<Utc>,
    pub mode: AnswerMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<i64>,
}

/// Exam row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredExam {
    pub id: i64,
    pub user_id: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub score: u32,
    pub answers: Vec<ExamAnswer>,
    pub mode: String,
    pub time_limit_minutes: Option<u32>,
    pub certification: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Password reset token row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetToken {
    pub token: String,
    pub user_id: i64,
    pub expires_at_ms: i64,
    pub used: bool,
}

impl ResetToken {
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        !self.used && self.expires_at_ms > now_ms
    }
}

/// Login session row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub expires_at_ms: i64,
}

/// Admin-authored study material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Per-user progress on one content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentProgress {
    pub user_id: i64,
    pub content_id: i64,
    pub completed: bool,
    pub percent: u32,
    pub updated_at: DateTime<Utc>,
}

/// One command/output pair in a saved terminal transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalEntry {
    pub command: String,
    pub output: String,
}

/// Saved simulated-terminal session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalSession {
    pub id: i64,
    pub user_id: i64,
    pub content_id: Option<i64>,
    pub transcript: Vec<TerminalEntry>,
    pub created_at: DateTime<Utc>,
}

/// Cached search payload keyed by query fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCacheEntry {
    pub fingerprint: String,
    pub query: String,
    pub provider: String,
    pub payload: String,
    pub expires_at_ms: i64,
}

/// Answer totals for one user, from the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerTotals {
    pub answered: u64,
    pub correct: u64,
}

// === API Request/Response Types ===

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnswerListQuery {
    pub mode: Option<AnswerMode>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedResponse {
    pub success: bool,
    pub id: i64,
}

/// Rollup totals next to what the answer log says.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDriftResponse {
    pub rollup: AnswerTotals,
    pub event_log: AnswerTotals,
    pub in_sync: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentRequest {
    pub title: String,
    pub body: String,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContentProgressRequest {
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub percent: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalSessionRequest {
    pub content_id: Option<i64>,
    #[serde(default)]
    pub transcript: Vec<TerminalEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// One normalized search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
    pub source: String,
}

/// Search response, also the cached payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub provider: String,
    #[serde(default)]
    pub cached: bool,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub purged: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsResponse {
    pub total_users: u64,
    pub active_users: u64,
    pub total_answers: u64,
    pub correct_answers: u64,
    pub global_accuracy: u32,
    pub top_users: Vec<RankedUser>,
    pub daily_activity: Vec<DailyCount>,
}
