//! Error types for quiz-core.

use thiserror::Error;

/// Result type alias using ValidationError.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Input rejected before it reaches the store or any external provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("query must be at least {min} characters")]
    QueryTooShort { min: usize },

    #[error("tally for '{key}' has {correct} correct out of {total}")]
    TallyOverflow { key: String, correct: u32, total: u32 },

    #[error("total correct ({correct}) exceeds total answered ({answered})")]
    TotalsOverflow { correct: u32, answered: u32 },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}
