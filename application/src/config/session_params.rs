//! Dialogue session parameters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Controls prompt building and the lifetime of dialogue sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParams {
    /// Transcript entries included in each turn's prompt.
    pub history_window: usize,
    /// Used when a start request gives no round limit.
    pub default_max_rounds: u32,
    /// Registry capacity.
    pub max_sessions: usize,
    /// Sessions idle this long are dropped on the next start.
    pub idle_expiry: Duration,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            history_window: 10,
            default_max_rounds: 5,
            max_sessions: 64,
            idle_expiry: Duration::from_secs(3600),
        }
    }
}

impl SessionParams {
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    pub fn with_idle_expiry(mut self, expiry: Duration) -> Self {
        self.idle_expiry = expiry;
        self
    }
}
