//! Common error types for AgroDetect

use thiserror::Error;

/// Common result type for AgroDetect operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across AgroDetect crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Identifier unknown or password mismatch
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
