//! Error types for reschema

use thiserror::Error;

/// Core error type for schema operations
#[derive(Error, Debug)]
pub enum SchemaError {
    /// An argument failed validation before any statement was built.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A mutation addressed a name that does not exist. Lookups return
    /// `None` instead of raising this.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The engine cannot perform the requested structural change.
    /// Raised before any statement is attempted.
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// The engine reported a failure executing a statement. The driver's
    /// error text is carried unchanged.
    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;
