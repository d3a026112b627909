//! Infrastructure layer for parley
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the Ollama inference gateway, web search,
//! transcript export, the JSONL conversation log, and configuration
//! file loading.

pub mod config;
pub mod export;
pub mod logging;
pub mod ollama;
pub mod search;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileBackendsConfig, FileCacheConfig, FileConfig,
    FileDialogueConfig, FileExportConfig, FileGenerationConfig, FileSearchConfig,
    FileUncertaintyConfig,
};
pub use export::FileTranscriptExporter;
pub use logging::JsonlConversationLogger;
pub use ollama::{OllamaError, OllamaGateway};
pub use search::{BraveSearch, DuckDuckGoSearch, FallbackSearch, SearchProvider, build_search};
