//! Error types for nice axis binning
//!
//! Provides a unified error type for all nicebin crates.

use std::fmt::Display;
use thiserror::Error;

/// Core error type for binning operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Bounds are reversed or not finite
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No valid values remained after filtering
    #[error("Empty dataset: no valid values to bin")]
    EmptyDataset,
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for reversed or non-finite bounds
    pub fn invalid_range(min: impl Display, max: impl Display) -> Self {
        Self::InvalidRange(format!(
            "min {min} and max {max} must be finite with min <= max"
        ))
    }

    /// Create an error for an option that must be strictly positive
    pub fn not_positive(name: &str, value: impl Display) -> Self {
        Self::InvalidParameter(format!("{name} must be positive and finite, got {value}"))
    }

    /// Create an error for a date outside the representable calendar
    pub fn out_of_calendar(context: &str) -> Self {
        Self::InvalidInput(format!("{context} is outside the representable calendar range"))
    }
}

/// Check that a pair of bounds forms a finite, ordered range
pub fn check_range(min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(Error::invalid_range(min, max));
    }
    Ok(())
}
