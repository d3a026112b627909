//! Dialogue configuration from TOML (`[dialogue]` section)

use super::zero_issue;
use parley_application::SessionParams;
use parley_domain::{ConfigIssue, DialogueType};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw dialogue settings from TOML.
///
/// # Example
///
/// ```toml
/// [dialogue]
/// history_window = 10
/// default_max_rounds = 6
/// default_type = "brainstorm"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDialogueConfig {
    pub history_window: usize,
    pub default_max_rounds: u32,
    /// "debate", "discussion" or "brainstorm"
    pub default_type: String,
    pub max_sessions: usize,
    pub idle_expiry_secs: u64,
}

impl Default for FileDialogueConfig {
    fn default() -> Self {
        let params = SessionParams::default();
        Self {
            history_window: params.history_window,
            default_max_rounds: params.default_max_rounds,
            default_type: DialogueType::default().as_str().to_string(),
            max_sessions: params.max_sessions,
            idle_expiry_secs: params.idle_expiry.as_secs(),
        }
    }
}

impl FileDialogueConfig {
    pub fn to_params(&self) -> SessionParams {
        SessionParams {
            history_window: self.history_window,
            default_max_rounds: self.default_max_rounds,
            max_sessions: self.max_sessions,
            idle_expiry: Duration::from_secs(self.idle_expiry_secs),
        }
    }

    /// Parse `default_type`, falling back to debate with a warning.
    pub fn parse_default_type(&self) -> (DialogueType, Vec<ConfigIssue>) {
        let (dialogue_type, mut issues) = DialogueType::parse_lenient(&self.default_type);
        for issue in &mut issues {
            issue.message = format!("dialogue.default_type: {}", issue.message);
        }
        (dialogue_type, issues)
    }

    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_default_type().1;
        if self.history_window == 0 {
            issues.push(zero_issue("dialogue.history_window"));
        }
        if self.default_max_rounds == 0 {
            issues.push(zero_issue("dialogue.default_max_rounds"));
        }
        if self.max_sessions == 0 {
            issues.push(zero_issue("dialogue.max_sessions"));
        }
        issues
    }
}
