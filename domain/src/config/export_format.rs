//! Transcript export format value object

use serde::{Deserialize, Serialize};

/// File format for saved transcripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Plain text with a topic/date header (default)
    #[default]
    Text,
    /// Pretty-printed JSON snapshot
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
        }
    }
}
