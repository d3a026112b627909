//! Generation parameters: sampling options and the request deadline.

use crate::ports::inference_gateway::GenerationOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sampling and deadline settings for inference calls.
///
/// Chat and dialogue calls use different context windows; both share
/// temperature and timeout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub chat_context_window: u32,
    pub dialogue_context_window: u32,
    pub temperature: f32,
    /// Deadline for one streaming call, first byte to completion.
    pub request_timeout: Duration,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            chat_context_window: 1024,
            dialogue_context_window: 4096,
            temperature: 0.7,
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl GenerationParams {
    pub fn chat_options(&self) -> GenerationOptions {
        GenerationOptions {
            context_window: self.chat_context_window,
            temperature: self.temperature,
        }
    }

    pub fn dialogue_options(&self) -> GenerationOptions {
        GenerationOptions {
            context_window: self.dialogue_context_window,
            temperature: self.temperature,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = GenerationParams::default();
        assert_eq!(params.chat_options().context_window, 1024);
        assert_eq!(params.dialogue_options().context_window, 4096);
        assert_eq!(params.request_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_builder() {
        let params = GenerationParams::default()
            .with_temperature(0.2)
            .with_request_timeout(Duration::from_secs(10));
        assert_eq!(params.dialogue_options().temperature, 0.2);
        assert_eq!(params.request_timeout, Duration::from_secs(10));
    }
}
