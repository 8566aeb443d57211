//! Error module containing error types and result aliases

mod model_error;

pub use model_error::ModelError;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
