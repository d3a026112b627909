//! Dialogue framing

use crate::config::validation::{ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};

/// How participants are asked to engage; affects persona context only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogueType {
    #[default]
    Debate,
    Discussion,
    Brainstorm,
}

impl DialogueType {
    pub const ALL: [DialogueType; 3] = [
        DialogueType::Debate,
        DialogueType::Discussion,
        DialogueType::Brainstorm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DialogueType::Debate => "debate",
            DialogueType::Discussion => "discussion",
            DialogueType::Brainstorm => "brainstorm",
        }
    }

    /// Fixed framing clause appended to every participant's system prompt
    pub fn framing_clause(&self) -> &'static str {
        match self {
            DialogueType::Debate => {
                "This is a debate. Take a clear position, defend it with arguments, \
                 and answer the points the other participants raise directly."
            }
            DialogueType::Discussion => {
                "This is an open discussion. Share your perspective, build on what \
                 others have said, and acknowledge good points even when you disagree."
            }
            DialogueType::Brainstorm => {
                "This is a brainstorming session. Propose new ideas, extend the ideas \
                 of others, and favour creativity over criticism."
            }
        }
    }

    /// Parse leniently: unknown values fall back to [`DialogueType::Debate`]
    /// and the fallback is reported as a warning.
    pub fn parse_lenient(s: &str) -> (Self, Vec<ConfigIssue>) {
        match s.parse() {
            Ok(t) => (t, vec![]),
            Err(_) => (
                DialogueType::Debate,
                vec![ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::InvalidEnumValue {
                        field: "dialogue_type".to_string(),
                        value: s.to_string(),
                        valid_values: Self::ALL.iter().map(|t| t.as_str().to_string()).collect(),
                    },
                    message: format!("unknown dialogue type '{}', falling back to 'debate'", s),
                }],
            ),
        }
    }
}

impl std::fmt::Display for DialogueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DialogueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debate" => Ok(DialogueType::Debate),
            "discussion" => Ok(DialogueType::Discussion),
            "brainstorm" | "brainstorming" => Ok(DialogueType::Brainstorm),
            other => Err(format!("unknown dialogue type: {}", other)),
        }
    }
}
