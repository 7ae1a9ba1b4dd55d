//! Error types for relation queries

use thiserror::Error;

/// Result type for relation queries
pub type RelationsResult<T> = Result<T, RelationsError>;

/// Errors that can occur before a traversal starts
///
/// Configuration shape problems never surface here; they only make the
/// resulting graph smaller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelationsError {
    #[error("depth must be 0 or positive")]
    InvalidDepth(i64),

    #[error("unknown traversal direction: {0} (expected both, upstream or downstream)")]
    InvalidDirection(String),
}
