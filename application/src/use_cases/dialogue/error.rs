//! Dialogue use case errors

use crate::ports::inference_gateway::GatewayError;
use crate::ports::transcript_exporter::ExportError;
use parley_domain::{DomainError, ModelId, SessionId, SlotId};
use thiserror::Error;

/// Errors that can occur while driving a dialogue session.
///
/// Every variant leaves the session's transcript and turn state exactly as
/// they were before the failed call.
#[derive(Error, Debug)]
pub enum DialogueError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Participant {slot} ({model}) is not available")]
    ParticipantUnavailable { slot: SlotId, model: ModelId },

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Timed out waiting for the model")]
    Timeout,

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Not allowed to access session {0}")]
    Unauthorized(SessionId),

    #[error("A turn is already being generated for session {0}")]
    TurnInProgress(SessionId),

    #[error("Waiting for the human participant in slot {0}")]
    HumanTurnPending(SlotId),

    #[error("Cancelled")]
    Cancelled,

    #[error("Session limit of {0} reached")]
    CapacityExceeded(usize),

    #[error(transparent)]
    Rejected(DomainError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl DialogueError {
    /// Whether re-issuing the same call may succeed without changing input.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DialogueError::ParticipantUnavailable { .. }
                | DialogueError::BackendUnavailable(_)
                | DialogueError::Timeout
                | DialogueError::InferenceError(_)
                | DialogueError::TurnInProgress(_)
                | DialogueError::Cancelled
        )
    }

    /// Map a gateway failure raised while `slot` was speaking.
    pub(crate) fn from_gateway(err: GatewayError, slot: SlotId, model: &ModelId) -> Self {
        match err {
            GatewayError::BackendUnavailable(detail) => DialogueError::BackendUnavailable(detail),
            GatewayError::Timeout => DialogueError::Timeout,
            GatewayError::InferenceError(detail) => DialogueError::InferenceError(detail),
            GatewayError::ModelNotAvailable(_) => DialogueError::ParticipantUnavailable {
                slot,
                model: model.clone(),
            },
            GatewayError::UnknownBackend(name) => {
                DialogueError::InvalidConfiguration(format!("unknown backend '{}'", name))
            }
            GatewayError::Cancelled => DialogueError::Cancelled,
        }
    }
}

impl From<DomainError> for DialogueError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidConfiguration(message) => DialogueError::InvalidConfiguration(message),
            DomainError::HumanTurnPending(slot) => DialogueError::HumanTurnPending(slot),
            other => DialogueError::Rejected(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(DialogueError::Timeout.is_retryable());
        assert!(DialogueError::BackendUnavailable("down".into()).is_retryable());
        assert!(!DialogueError::InvalidConfiguration("bad".into()).is_retryable());
        assert!(!DialogueError::SessionNotFound(SessionId::generate()).is_retryable());
    }

    #[test]
    fn test_domain_mapping() {
        let slot = SlotId::new(5).unwrap();
        assert!(matches!(
            DialogueError::from(DomainError::HumanTurnPending(slot)),
            DialogueError::HumanTurnPending(s) if s == slot
        ));
        assert!(matches!(
            DialogueError::from(DomainError::NotHumanTurn),
            DialogueError::Rejected(DomainError::NotHumanTurn)
        ));
    }
}
