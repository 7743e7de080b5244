//! Password reset tokens and login sessions.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::users::ensure_user;
use super::{Database, DbError, Result};
use crate::models::{ResetToken, Session, User};

/// 32 random bytes, hex encoded.
pub(crate) fn random_token() -> String {
    Uuid::new_v4()
        .as_bytes()
        .iter()
        .chain(Uuid::new_v4().as_bytes().iter())
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn row_to_reset_token(row: &Row<'_>) -> rusqlite::Result<ResetToken> {
    Ok(ResetToken {
        token: row.get(0)?,
        user_id: row.get(1)?,
        expires_at_ms: row.get(2)?,
        used: row.get(3)?,
    })
}

fn find_reset_token(conn: &Connection, token: &str) -> Result<Option<ResetToken>> {
    conn.query_row(
        "SELECT token, user_id, expires_at_ms, used FROM password_reset_tokens WHERE token = ?1",
        params![token],
        row_to_reset_token,
    )
    .optional()
    .map_err(Into::into)
}

impl Database {
    // === Password Reset Tokens ===

    /// Issue a fresh reset token, invalidating every earlier one for the user.
    pub fn issue_reset_token(&self, user_id: i64, ttl_ms: i64) -> Result<ResetToken> {
        self.write(|conn| {
            ensure_user(conn, user_id)?;
            conn.execute(
                "UPDATE password_reset_tokens SET used = 1 WHERE user_id = ?1 AND used = 0",
                params![user_id],
            )?;

            let token = ResetToken {
                token: random_token(),
                user_id,
                expires_at_ms: Utc::now().timestamp_millis().saturating_add(ttl_ms),
                used: false,
            };
            conn.execute(
                "INSERT INTO password_reset_tokens (token, user_id, expires_at_ms, used)
                 VALUES (?1, ?2, ?3, 0)",
                params![token.token, token.user_id, token.expires_at_ms],
            )?;
            Ok(token)
        })
    }

    pub fn get_reset_token(&self, token: &str) -> Result<Option<ResetToken>> {
        self.read(|conn| find_reset_token(conn, token))
    }

    /// Spend a reset token: set the new password hash, mark the token used
    /// and drop the user's sessions. Returns the user id.
    pub fn redeem_reset_token(&self, token: &str, password_hash: &str, now_ms: i64) -> Result<i64> {
        self.write(|conn| {
            let stored = find_reset_token(conn, token)?
                .filter(|t| t.is_valid_at(now_ms))
                .ok_or(DbError::InvalidToken)?;

            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "UPDATE users SET password_hash = ?1 WHERE id = ?2",
                params![password_hash, stored.user_id],
            )?;
            tx.execute(
                "UPDATE password_reset_tokens SET used = 1 WHERE token = ?1",
                params![stored.token],
            )?;
            tx.execute(
                "DELETE FROM sessions WHERE user_id = ?1",
                params![stored.user_id],
            )?;
            tx.commit()?;

            Ok(stored.user_id)
        })
    }

    // === Sessions ===

    pub fn create_session(&self, user_id: i64, ttl_ms: i64) -> Result<Session> {
        self.write(|conn| {
            ensure_user(conn, user_id)?;
            let session = Session {
                token: random_token(),
                user_id,
                expires_at_ms: Utc::now().timestamp_millis().saturating_add(ttl_ms),
            };
            conn.execute(
                "INSERT INTO sessions (token, user_id, created_at, expires_at_ms)
                 VALUES (?1, ?2, ?3, ?4)",
                params![session.token, session.user_id, Utc::now(), session.expires_at_ms],
            )?;
            Ok(session)
        })
    }

    /// The user behind an unexpired session token.
    pub fn get_session_user(&self, token: &str, now_ms: i64) -> Result<Option<User>> {
        let user_id: Option<i64> = self.read(|conn| {
            conn.query_row(
                "SELECT user_id FROM sessions WHERE token = ?1 AND expires_at_ms > ?2",
                params![token, now_ms],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
        })?;

        match user_id {
            Some(id) => self.get_user(id),
            None => Ok(None),
        }
    }

    pub fn revoke_session(&self, token: &str) -> Result<bool> {
        self.write(|conn| {
            let deleted = conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
            Ok(deleted > 0)
        })
    }

    /// Drop all of a user's sessions except `keep`.
    pub fn revoke_other_sessions(&self, user_id: i64, keep: &str) -> Result<usize> {
        self.write(|conn| {
            let deleted = conn.execute(
                "DELETE FROM sessions WHERE user_id = ?1 AND token != ?2",
                params![user_id, keep],
            )?;
            Ok(deleted)
        })
    }
}
