//! Core error types for the Ledgerfolio engine.
//!
//! Metric-level failures (solver non-convergence, guarded ratios,
//! classification gaps) are outcomes, not errors; see `RateOutcome`. The
//! types here cover the seams only: the ledger store behind
//! `LedgerRepositoryTrait` and caller-supplied parameters.

use chrono::NaiveDate;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
///
/// Store-specific errors are wrapped in string form to keep this type
/// storage-agnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Wraps a store failure message from a `LedgerRepositoryTrait` impl.
    pub fn repository(message: impl Into<String>) -> Self {
        Error::Repository(message.into())
    }
}

/// Validation errors for caller-supplied filters and configuration.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid configuration value: {0}")]
    InvalidConfiguration(String),
}
