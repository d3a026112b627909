//! Streaming events for inference calls.
//!
//! [`StreamEvent`] represents individual events in a streaming model
//! response. A well-formed stream is zero or more [`Delta`](StreamEvent::Delta)
//! events followed by exactly one terminal event.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Why an inference call failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum InferenceFailure {
    /// The backend refused the connection or could not be reached.
    BackendUnavailable(String),
    /// The caller-supplied deadline passed before completion.
    Timeout,
    /// The backend does not have the requested model installed.
    ModelNotFound(String),
    /// Any other failure reported by the backend.
    InferenceError(String),
}

impl std::fmt::Display for InferenceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceFailure::BackendUnavailable(detail) => {
                write!(f, "backend unavailable: {}", detail)
            }
            InferenceFailure::Timeout => write!(f, "timed out"),
            InferenceFailure::ModelNotFound(detail) => write!(f, "model not found: {}", detail),
            InferenceFailure::InferenceError(detail) => write!(f, "inference error: {}", detail),
        }
    }
}

/// An event in a streaming model response.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A text chunk. Chunk boundaries carry no meaning.
    Delta(String),
    /// The concatenation of every delta, and how long the call took.
    Completed { text: String, elapsed: Duration },
    /// The call failed; no further events follow.
    Failed(InferenceFailure),
}

impl StreamEvent {
    /// Returns the text content if this is a Delta or Completed event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) => Some(s),
            StreamEvent::Completed { text, .. } => Some(text),
            StreamEvent::Failed(_) => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamEvent::Completed { .. } | StreamEvent::Failed(_)
        )
    }
}
