//! Presentation-level configuration
//!
//! Settings for the interactive REPLs.

use std::path::PathBuf;

/// REPL configuration for the presentation layer
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Stream model output with a spinner; otherwise print finished text
    pub show_progress: bool,
    /// Line-editor history; `None` disables persistence
    pub history_file: Option<PathBuf>,
}

impl ReplConfig {
    /// `$XDG_DATA_HOME/parley/<name>`
    pub fn default_history(name: &str) -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("parley").join(name))
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: Self::default_history("history.txt"),
        }
    }
}
