//! Search result cache repository.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::{Database, Result};
use crate::models::SearchCacheEntry;

impl Database {
    // === Search Cache ===

    /// Entry for `fingerprint`, expired or not. Callers check expiry.
    pub fn get_cache_entry(&self, fingerprint: &str) -> Result<Option<SearchCacheEntry>> {
        self.read(|conn| {
            conn.query_row(
                "SELECT fingerprint, query, provider, payload, expires_at_ms
                 FROM search_cache WHERE fingerprint = ?1",
                params![fingerprint],
                |row| {
                    Ok(SearchCacheEntry {
                        fingerprint: row.get(0)?,
                        query: row.get(1)?,
                        provider: row.get(2)?,
                        payload: row.get(3)?,
                        expires_at_ms: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
        })
    }

    /// Insert or replace the entry for its fingerprint, resetting the expiry.
    pub fn upsert_cache_entry(&self, entry: &SearchCacheEntry) -> Result<()> {
        self.write(|conn| {
            conn.execute(
                "INSERT INTO search_cache (fingerprint, query, provider, payload, expires_at_ms, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (fingerprint) DO UPDATE SET
                    query = excluded.query,
                    provider = excluded.provider,
                    payload = excluded.payload,
                    expires_at_ms = excluded.expires_at_ms,
                    created_at = excluded.created_at",
                params![
                    entry.fingerprint,
                    entry.query,
                    entry.provider,
                    entry.payload,
                    entry.expires_at_ms,
                    Utc::now(),
                ],
            )?;
            Ok(())
        })
    }

    /// Remove entries whose expiry is at or before `now_ms`.
    pub fn purge_expired_cache(&self, now_ms: i64) -> Result<usize> {
        self.write(|conn| {
            let purged = conn.execute(
                "DELETE FROM search_cache WHERE expires_at_ms <= ?1",
                params![now_ms],
            )?;
            Ok(purged)
        })
    }

    pub fn cache_entry_count(&self) -> Result<usize> {
        self.read(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM search_cache", [], |row| row.get(0))?;
            Ok(usize::try_from(n).unwrap_or(0))
        })
    }
}
