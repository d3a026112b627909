//! Configuration file loading for parley
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `PARLEY_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./parley.toml` or `./.parley.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/parley/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileBackendsConfig, FileCacheConfig, FileConfig, FileDialogueConfig,
    FileExportConfig, FileGenerationConfig, FileSearchConfig, FileUncertaintyConfig,
};
pub use loader::ConfigLoader;
