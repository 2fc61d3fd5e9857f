//! Error taxonomy shared by every domain service.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// The referenced record does not exist
    #[error("{0} not found")]
    NotFound(String),
    /// Input failed validation; the caller can fix and retry
    #[error("{0}")]
    Validation(String),
    /// The operation does not apply to the record's current state
    #[error("{0}")]
    InvalidState(String),
    #[error("Invalid username or password")]
    Unauthorized,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Longest look-ahead accepted for date windows (about ten years)
pub const MAX_WINDOW_DAYS: i64 = 3650;

impl DomainError {
    pub fn not_found(kind: &str, id: &str) -> Self {
        DomainError::NotFound(format!("{} '{}'", kind, id))
    }
}

/// Reject empty or whitespace-only text fields
pub fn require_text(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// Reject NaN, infinities and negative amounts
pub fn require_non_negative(field: &str, value: f64) -> DomainResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::Validation(format!(
            "{} must be a non-negative number",
            field
        )));
    }
    Ok(value)
}

/// Reject NaN, infinities, zero and negative amounts
pub fn require_positive(field: &str, value: f64) -> DomainResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DomainError::Validation(format!(
            "{} must be greater than zero",
            field
        )));
    }
    Ok(value)
}

/// Accept a look-ahead window of `0..=MAX_WINDOW_DAYS` days
pub fn require_window_days(field: &str, days: i64) -> DomainResult<i64> {
    if !(0..=MAX_WINDOW_DAYS).contains(&days) {
        return Err(DomainError::Validation(format!(
            "{} must be between 0 and {}",
            field, MAX_WINDOW_DAYS
        )));
    }
    Ok(days)
}
