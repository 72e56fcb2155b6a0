//! Error types for card_list_service

use thiserror::Error;

/// Unified error type for the upload pipeline
///
/// Card lookup failures never show up here: they become placeholder cards.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The uploaded CSV could not be read (bad encoding, broken stream)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// File I/O failed (spooling the upload, binding the listener)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result alias for card_list_service operations
pub type Result<T> = std::result::Result<T, ServiceError>;
