//! Common error types for nbmn

use thiserror::Error;

/// Common result type for nbmn operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the nbmn crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Remote catalog or webhook failure
    #[error("Remote error: {0}")]
    Remote(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
