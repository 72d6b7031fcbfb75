//! Error types for metrictree

use std::fmt;

/// Result type alias for metrictree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for metrictree
#[derive(Debug)]
pub enum Error {
    /// Arrow-related errors
    Arrow(arrow::error::ArrowError),
    /// Metric name missing or empty
    InvalidName,
    /// Dataset columns do not match the required long-format schema
    InvalidSchema(String),
    /// Aggregation function outside the supported set
    InvalidAggregation(String),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Arrow(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Arrow(e) => write!(f, "Arrow error: {}", e),
            Error::InvalidName => write!(f, "Metric name must be a non-empty string"),
            Error::InvalidSchema(msg) => write!(f, "Invalid schema: {}", msg),
            Error::InvalidAggregation(name) => write!(
                f,
                "Invalid aggregation function '{}': expected one of sum, mean, median",
                name
            ),
        }
    }
}

impl From<arrow::error::ArrowError> for Error {
    fn from(e: arrow::error::ArrowError) -> Self {
        Error::Arrow(e)
    }
}
