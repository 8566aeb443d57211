//! Store error types.

use thiserror::Error;

/// Errors raised by reading store backends.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backend could not be reached
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A query or write failed after the connection was established
    #[error("Query failed: {0}")]
    Query(String),

    /// The backend refused the write (e.g. constraint violation)
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// The caller supplied a value the store cannot accept
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
