//! Export configuration from TOML (`[export]` section)

use parley_domain::ExportFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw export settings from TOML.
///
/// # Example
///
/// ```toml
/// [export]
/// directory = "~/parley/transcripts"
/// format = "json"
/// conversation_log = "~/.local/share/parley/conversation.jsonl"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExportConfig {
    /// Where saved transcripts go (current directory when unset)
    pub directory: Option<String>,
    pub format: ExportFormat,
    /// JSONL conversation log; disabled when unset
    pub conversation_log: Option<String>,
}

impl FileExportConfig {
    pub fn directory_path(&self) -> PathBuf {
        self.directory
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn conversation_log_path(&self) -> Option<PathBuf> {
        self.conversation_log.as_deref().map(expand_home)
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
