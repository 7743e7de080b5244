//! User repository.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{parse_column, Database, DbError, Result};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, display_name, role, created_at, last_login";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        display_name: row.get(4)?,
        role: parse_column(row, 5)?,
        created_at: row.get(6)?,
        last_login: row.get(7)?,
    })
}

/// Fail with `NotFound` unless user `id` exists.
pub(crate) fn ensure_user(conn: &Connection, id: i64) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(DbError::NotFound(format!("user {}", id)))
    }
}

fn find_user(conn: &Connection, column: &str, value: &dyn rusqlite::ToSql) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column);
    conn.query_row(&sql, [value], row_to_user)
        .optional()
        .map_err(Into::into)
}

impl Database {
    // === User Repository ===

    /// Insert a user. Duplicate username or email is a `Conflict`.
    pub fn create_user(&self, user: &NewUser) -> Result<User> {
        self.write(|conn| {
            conn.execute(
                "INSERT INTO users (username, email, password_hash, display_name, role, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user.username,
                    user.email,
                    user.password_hash,
                    user.display_name,
                    user.role.as_str(),
                    Utc::now(),
                ],
            )
            .map_err(|e| DbError::unique_or(e, "username or email is already registered"))?;

            let id = conn.last_insert_rowid();
            find_user(conn, "id", &id)?
                .ok_or_else(|| DbError::NotFound(format!("user {}", id)))
        })
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.read(|conn| find_user(conn, "id", &id))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.read(|conn| find_user(conn, "username", &username))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.read(|conn| find_user(conn, "email", &email))
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.read(|conn| {
            let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let users = stmt
                .query_map([], row_to_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(users)
        })
    }

    pub fn touch_last_login(&self, id: i64) -> Result<()> {
        self.write(|conn| {
            let updated = conn.execute(
                "UPDATE users SET last_login = ?1 WHERE id = ?2",
                params![Utc::now(), id],
            )?;
            if updated == 0 {
                return Err(DbError::NotFound(format!("user {}", id)));
            }
            Ok(())
        })
    }

    pub fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        self.write(|conn| {
            let updated = conn.execute(
                "UPDATE users SET password_hash = ?1 WHERE id = ?2",
                params![password_hash, id],
            )?;
            if updated == 0 {
                return Err(DbError::NotFound(format!("user {}", id)));
            }
            Ok(())
        })
    }

    /// Delete a user and every row it owns.
    ///
    /// Runs as one transaction: either all owned rows and the user go, or
    /// nothing changes.
    pub fn delete_user(&self, id: i64) -> Result<()> {
        self.write(|conn| {
            ensure_user(conn, id)?;

            let tx = conn.unchecked_transaction()?;
            for table in [
                "user_answers",
                "study_progress",
                "exams",
                "password_reset_tokens",
                "content_progress",
                "terminal_sessions",
                "sessions",
            ] {
                tx.execute(
                    &format!("DELETE FROM {} WHERE user_id = ?1", table),
                    params![id],
                )?;
            }
            tx.execute("DELETE FROM users WHERE id = ?1", params![id])?;
            tx.commit()?;

            Ok(())
        })
    }
}
