//! Error types for the meanshift library.

use thiserror::Error;

/// Result type alias for changepoint operations.
pub type Result<T> = std::result::Result<T, ShiftError>;

/// Errors that can occur during significance testing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShiftError {
    /// Series has no valid split point.
    #[error("series too short: need at least {needed} observations, got {got}")]
    SeriesTooShort { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Too few finite bootstrap draws to form a confidence interval.
    #[error("insufficient bootstrap samples: need at least {needed} finite draws, got {got}")]
    InsufficientSamples { needed: usize, got: usize },

    /// An internal numeric self-check failed. Indicates an arithmetic
    /// defect, not a data condition; never retried.
    #[error("numeric assertion failed: {0}")]
    NumericAssertion(String),
}
