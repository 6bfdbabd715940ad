//! Error types for the Artifacter client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the generation service
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to initialize the service
    #[error("Service initialization failed: {0}")]
    InitializationError(String),

    /// An operation was issued before `load`
    #[error("Service not loaded")]
    NotLoaded,

    /// `load` was issued twice
    #[error("Service already loaded")]
    AlreadyLoaded,

    /// Failed to look up a user's characters
    #[error("Character lookup failed: {0}")]
    LookupError(String),

    /// Failed to generate an image
    #[error("Generation failed: {0}")]
    GenerateError(String),

    /// A generation parameter could not be parsed
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Operator input could not be understood
    #[error("Invalid input: {0}")]
    InputError(String),

    /// Local I/O failure (console or output file)
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
