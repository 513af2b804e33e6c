//! Error types for the contango engine.
//!
//! Structural and configuration problems are errors and propagate to the
//! caller. Sparse history and bad price rows are not: they degrade to
//! undefined cells or dropped rows and are reported through `tracing`.

use thiserror::Error;

/// The main error type for contango operations.
#[derive(Debug, Error)]
pub enum ContangoError {
    /// The spot and futures series share no usable rows after alignment.
    #[error("Alignment failed: {0}")]
    Alignment(String),

    /// A configuration value is outside its domain.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A transform was applied before the columns it reads exist.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error due to invalid or malformed input data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when data is insufficient for the requested operation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl ContangoError {
    /// Shorthand for building an [`ContangoError::InvalidParameter`].
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Whether this error only means the two inputs never overlapped.
    ///
    /// Batch callers skip such a sampling interval and carry on with others.
    pub const fn is_alignment(&self) -> bool {
        matches!(self, Self::Alignment(_))
    }
}

impl From<String> for ContangoError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for ContangoError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for contango operations.
pub type Result<T> = std::result::Result<T, ContangoError>;
