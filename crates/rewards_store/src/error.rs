//! Rewards store error types.

use thiserror::Error;

/// Errors that can occur during rewards store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key-value backend failed or is unavailable.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Writing the value would exceed the backend's capacity.
    #[error("Storage quota exceeded writing {key}: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// Stored data could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File-backed storage I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The wallet address is empty or otherwise unusable as a key.
    #[error("Invalid wallet address: {0:?}")]
    InvalidAddress(String),
}

impl StoreError {
    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// Result type for rewards store operations.
pub type StoreResult<T> = Result<T, StoreError>;
