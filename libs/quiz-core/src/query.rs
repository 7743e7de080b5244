//! Search query normalization.

use crate::error::{Result, ValidationError};

/// Shortest query accepted after trimming.
pub const MIN_QUERY_LEN: usize = 2;

/// A trimmed, lower-cased query that passed length validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedQuery(String);

impl NormalizedQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NormalizedQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Trim and lower-case `raw`, rejecting anything shorter than [`MIN_QUERY_LEN`].
///
/// Length is counted in characters, not bytes.
pub fn normalize_query(raw: &str) -> Result<NormalizedQuery> {
    let normalized = raw.trim().to_lowercase();
    if normalized.chars().count() < MIN_QUERY_LEN {
        return Err(ValidationError::QueryTooShort { min: MIN_QUERY_LEN });
    }
    Ok(NormalizedQuery(normalized))
}
