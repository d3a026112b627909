//! Transcript export port

use parley_domain::{ExportFormat, SessionSnapshot};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write transcript: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize transcript: {0}")]
    Serialize(String),
}

/// Writes a dialogue transcript somewhere durable and reports where.
pub trait TranscriptExporter: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn export(&self, snapshot: &SessionSnapshot) -> Result<PathBuf, ExportError>;
}
