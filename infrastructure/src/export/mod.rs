//! Transcript export to files
//!
//! Files are named `dialogue_<YYYYmmdd_HHMMSS>.<ext>` inside the export
//! directory; a numeric suffix is added when that name is already taken.

mod text;

use chrono::{DateTime, Local};
use parley_application::{ExportError, TranscriptExporter};
use parley_domain::{ExportFormat, SessionSnapshot};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes transcripts into a directory in one [`ExportFormat`].
#[derive(Debug, Clone)]
pub struct FileTranscriptExporter {
    directory: PathBuf,
    format: ExportFormat,
}

#[derive(Serialize)]
struct JsonExport<'a> {
    exported_at: String,
    #[serde(flatten)]
    snapshot: &'a SessionSnapshot,
}

impl FileTranscriptExporter {
    pub fn new(directory: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            directory: directory.into(),
            format,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    /// Render `snapshot` as it would be written at `exported_at`.
    pub fn render(
        &self,
        snapshot: &SessionSnapshot,
        exported_at: DateTime<Local>,
    ) -> Result<String, ExportError> {
        match self.format {
            ExportFormat::Text => Ok(text::render(snapshot, exported_at)),
            ExportFormat::Json => serde_json::to_string_pretty(&JsonExport {
                exported_at: exported_at.to_rfc3339(),
                snapshot,
            })
            .map_err(|e| ExportError::Serialize(e.to_string())),
        }
    }

    fn export_at(
        &self,
        snapshot: &SessionSnapshot,
        exported_at: DateTime<Local>,
    ) -> Result<PathBuf, ExportError> {
        let content = self.render(snapshot, exported_at)?;
        std::fs::create_dir_all(&self.directory)?;

        let stem = format!("dialogue_{}", exported_at.format("%Y%m%d_%H%M%S"));
        let extension = self.format.extension();
        let mut attempt = 1;
        loop {
            let name = if attempt == 1 {
                format!("{}.{}", stem, extension)
            } else {
                format!("{}_{}.{}", stem, attempt, extension)
            };
            let path = self.directory.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(content.as_bytes())?;
                    info!(
                        "Exported session {} to {}",
                        snapshot.session_id,
                        path.display()
                    );
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl TranscriptExporter for FileTranscriptExporter {
    fn format(&self) -> ExportFormat {
        self.format
    }

    fn export(&self, snapshot: &SessionSnapshot) -> Result<PathBuf, ExportError> {
        self.export_at(snapshot, Local::now())
    }
}
