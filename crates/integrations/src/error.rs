//! Integration error types

use thiserror::Error;

/// Errors raised by external collaborators
#[derive(Error, Debug)]
pub enum IntegrationError {
    /// No wallet extension is available
    #[error("Wallet not installed: {0}")]
    WalletNotInstalled(String),

    /// The user dismissed the connection prompt
    #[error("Connection request rejected by user")]
    ConnectionRejected,

    /// The wallet provider threw
    #[error("Wallet provider error: {0}")]
    Provider(String),

    /// The wallet reported an address the client does not accept
    #[error("Invalid wallet address: {0:?}")]
    InvalidAddress(String),

    /// The RPC endpoint returned an error object
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Transport failure talking to a remote endpoint
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not have the expected shape
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Nothing to send to the assistant
    #[error("Empty prompt")]
    EmptyPrompt,
}

/// Result type for integration operations
pub type IntegrationResult<T> = Result<T, IntegrationError>;
