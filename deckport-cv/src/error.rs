//! Error types for deckport-cv
//!
//! Fatal conversion errors only. Per-record problems (not-found, identity
//! mismatch, unusable identifiers) are data, recorded on the affected
//! outcome, and never surface through this type.

use thiserror::Error;

/// Fatal converter error
#[derive(Debug, Error)]
pub enum ConvertError {
    /// CSV structure error (missing header row, unreadable records)
    #[error("CSV error: {0}")]
    Csv(String),

    /// Requested dialect id does not exist in the registry
    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    /// Canonical set list could not be loaded
    #[error("Set catalog error: {0}")]
    SetCatalog(String),

    /// Conversion cancelled by the caller
    #[error("Conversion cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// deckport-common error
    #[error("Common error: {0}")]
    Common(#[from] deckport_common::Error),
}

/// Result type for converter operations
pub type Result<T> = std::result::Result<T, ConvertError>;
