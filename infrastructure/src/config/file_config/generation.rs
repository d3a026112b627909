//! Generation configuration from TOML (`[generation]` section)

use super::zero_issue;
use parley_application::GenerationParams;
use parley_domain::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw generation settings from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    /// Context window for single-model chat
    pub chat_context_window: u32,
    /// Context window for dialogue turns
    pub dialogue_context_window: u32,
    pub temperature: f32,
    /// Deadline for one streaming call
    pub request_timeout_secs: u64,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        let params = GenerationParams::default();
        Self {
            chat_context_window: params.chat_context_window,
            dialogue_context_window: params.dialogue_context_window,
            temperature: params.temperature,
            request_timeout_secs: params.request_timeout.as_secs(),
        }
    }
}

impl FileGenerationConfig {
    pub fn to_params(&self) -> GenerationParams {
        GenerationParams {
            chat_context_window: self.chat_context_window,
            dialogue_context_window: self.dialogue_context_window,
            temperature: self.temperature,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.chat_context_window == 0 {
            issues.push(zero_issue("generation.chat_context_window"));
        }
        if self.dialogue_context_window == 0 {
            issues.push(zero_issue("generation.dialogue_context_window"));
        }
        if self.request_timeout_secs == 0 {
            issues.push(zero_issue("generation.request_timeout_secs"));
        }
        issues
    }
}
