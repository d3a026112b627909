//! Conversation log port
//!
//! Session starts, completed turns, moderator notes and chat answers are
//! recorded here as machine-readable events. Diagnostics stay in `tracing`.

use serde_json::Value;

/// One conversation event: a type tag and a JSON payload
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// `session_started`, `turn_completed`, `chat_response`, ...
    pub event_type: &'static str,
    pub payload: Value,
}

impl ConversationEvent {
    /// Create a new conversation event. The logger stamps the time.
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Sink for conversation events.
///
/// `log` never fails; an adapter that cannot write drops the event.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Discards every event
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
