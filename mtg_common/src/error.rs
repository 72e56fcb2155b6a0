//! Error type for external card lookups

use thiserror::Error;

/// Why a single card lookup against Scryfall did not produce a card
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed (network error, timeout, undecodable body)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Scryfall answered with its own error object
    #[error("Scryfall error {status} ({code}): {details}")]
    Api {
        status: u16,
        code: String,
        details: String,
    },
    /// Non-success status without a readable error object
    #[error("HTTP error: {0}")]
    HttpStatus(u16),
}

impl LookupError {
    /// True when the lookup failed because the card simply does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            LookupError::Api { status, .. } | LookupError::HttpStatus(status) => *status == 404,
            LookupError::Network(_) => false,
        }
    }
}
