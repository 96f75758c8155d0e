//! Error types
//!
//! Numerically undefined results are never errors; they surface as `None` in
//! the result values. The types here cover input that is structurally invalid
//! and the I/O around price tables and result files.

use chrono::NaiveDate;
use thiserror::Error;

/// Input rejected at the API boundary before any arithmetic runs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("monthly contribution must be non-negative, got {0}")]
    NegativeContribution(f64),

    #[error("duration must be non-negative: end age {end_age} is before start age {start_age}")]
    NegativeDuration { start_age: u32, end_age: u32 },

    #[error("projection horizon of {years} years exceeds the supported maximum of {max}")]
    HorizonTooLong { years: u32, max: u32 },

    #[error("target amount must be non-negative, got {0}")]
    NegativeTarget(f64),

    #[error("{field} must be a finite number, got {value}")]
    NonFiniteValue { field: &'static str, value: f64 },

    #[error("price on {date} must be finite and positive, got {value}")]
    InvalidPrice { date: NaiveDate, value: f64 },

    #[error("dates must be strictly increasing: {next} follows {previous}")]
    UnorderedDates { previous: NaiveDate, next: NaiveDate },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ValidationError {
    /// Check that a named input is finite
    pub(crate) fn ensure_finite(field: &'static str, value: f64) -> std::result::Result<f64, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::NonFiniteValue { field, value })
        }
    }
}

/// Crate-level error for everything that touches files or parsing
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("price table has no Date column")]
    MissingDateColumn,

    #[error("invalid date '{value}' on row {row}")]
    InvalidDate { row: usize, value: String },

    #[error("invalid value '{value}' for {symbol} on row {row}")]
    InvalidCell {
        row: usize,
        symbol: String,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
