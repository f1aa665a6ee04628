//! Query error types
//!
//! Defines the validation failures that can occur while assembling a query.
//! Escaping never fails, so these are the only ways a build can be rejected.

use thiserror::Error;

/// Errors that can occur while building a query string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Aggregation function name is not a bare identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Interval token is not `<digits><unit letters>`
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// Timestamp text could not be parsed as ISO-8601
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl QueryError {
    /// The offending input value
    pub fn value(&self) -> &str {
        match self {
            Self::InvalidIdentifier(v) | Self::InvalidInterval(v) | Self::InvalidTimestamp(v) => v,
        }
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
