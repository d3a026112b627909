//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Each section converts itself into the application-layer parameter type
//! it feeds and reports its own [`ConfigIssue`]s.

mod backends;
mod cache;
mod dialogue;
mod export;
mod generation;
mod search;
mod uncertainty;

pub use backends::FileBackendsConfig;
pub use cache::FileCacheConfig;
pub use dialogue::FileDialogueConfig;
pub use export::FileExportConfig;
pub use generation::FileGenerationConfig;
pub use search::FileSearchConfig;
pub use uncertainty::FileUncertaintyConfig;

use parley_domain::{ConfigIssue, ConfigIssueCode, PersonaCatalog, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Raised when validation finds at least one fatal issue.
#[derive(Debug, Error)]
#[error("invalid configuration: {}", .issues.iter().map(|i| i.message.as_str()).collect::<Vec<_>>().join("; "))]
pub struct ConfigValidationError {
    pub issues: Vec<ConfigIssue>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Inference backends and their hosts
    pub backends: FileBackendsConfig,
    /// Sampling options and request deadline
    pub generation: FileGenerationConfig,
    /// Response cache and model list freshness
    pub cache: FileCacheConfig,
    /// Dialogue defaults and session registry bounds
    pub dialogue: FileDialogueConfig,
    /// Hedging detection and search augmentation
    pub uncertainty: FileUncertaintyConfig,
    /// Web search provider
    pub search: FileSearchConfig,
    /// Persona id to instruction, merged over the built-ins
    pub personas: BTreeMap<String, String>,
    /// Transcript export and conversation log
    pub export: FileExportConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.backends.issues());
        issues.extend(self.generation.issues());
        issues.extend(self.cache.issues());
        issues.extend(self.dialogue.issues());
        issues.extend(self.uncertainty.issues());
        issues.extend(self.search.issues());

        for (id, instruction) in &self.personas {
            if instruction.trim().is_empty() {
                issues.push(ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::MissingValue {
                        field: format!("personas.{}", id),
                    },
                    message: format!("personas.{}: empty instruction is ignored", id),
                });
            }
        }

        issues
    }

    /// Like [`validate`](Self::validate), but fails when any issue is fatal.
    /// Warnings are returned for the caller to display.
    pub fn validate_strict(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let issues = self.validate();
        if issues.iter().any(ConfigIssue::is_error) {
            Err(ConfigValidationError {
                issues: issues.into_iter().filter(ConfigIssue::is_error).collect(),
            })
        } else {
            Ok(issues)
        }
    }

    /// Built-in personas with `[personas]` entries layered on top.
    pub fn persona_catalog(&self) -> PersonaCatalog {
        PersonaCatalog::builtin().with_overrides(
            self.personas
                .iter()
                .filter(|(_, instruction)| !instruction.trim().is_empty())
                .map(|(id, instruction)| (id.clone(), instruction.clone())),
        )
    }
}

pub(super) fn zero_issue(field: &str) -> ConfigIssue {
    ConfigIssue {
        severity: Severity::Error,
        code: ConfigIssueCode::ZeroValue {
            field: field.to_string(),
        },
        message: format!("{}: must be greater than zero", field),
    }
}
