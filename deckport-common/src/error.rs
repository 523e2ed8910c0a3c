//! Common error types for Deckport

use thiserror::Error;

/// Common result type for Deckport operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Deckport crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Failed to parse a file or response
    #[error("Parse error: {0}")]
    Parse(String),

    /// Operation cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
