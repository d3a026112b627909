//! Domain error types

use crate::dialogue::participant::SlotId;
use thiserror::Error;

/// Domain-level errors
///
/// Raised by the dialogue state machine and by value-object validation.
/// None of these leave a session partially mutated: every operation that
/// returns an error has not touched the transcript or the turn pointer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid transition: cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: String },

    #[error("Slot {0} belongs to the human participant; submit their turn first")]
    HumanTurnPending(SlotId),

    #[error("It is not the human participant's turn")]
    NotHumanTurn,
}

impl DomainError {
    /// Shorthand for an [`InvalidConfiguration`](DomainError::InvalidConfiguration) error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        DomainError::InvalidConfiguration(message.into())
    }

    /// Check if this error is caused by bad user input (not retryable)
    pub fn is_configuration(&self) -> bool {
        matches!(self, DomainError::InvalidConfiguration(_))
    }
}
