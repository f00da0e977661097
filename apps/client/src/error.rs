//! Client error types.

use entities::ValidationErrors;
use integrations::IntegrationError;
use rewards_store::StoreError;

/// Errors surfaced to the user by the connection flow.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// Wallet, balance or assistant failure.
    #[error(transparent)]
    Integration(#[from] IntegrationError),

    /// Profile form rejected; nothing was saved.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// A write to local storage failed.
    #[error("Could not save your data: {0}")]
    Store(#[from] StoreError),

    /// The action is not available in the current state.
    #[error("Cannot {action} while {state}")]
    InvalidState {
        state: &'static str,
        action: &'static str,
    },
}

impl FlowError {
    /// Returns the field-level messages when this is a validation failure.
    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            FlowError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type alias for flow operations.
pub type FlowResult<T> = Result<T, FlowError>;
