//! Uncertainty detection configuration from TOML (`[uncertainty]` section)

use super::zero_issue;
use parley_application::AugmentationParams;
use parley_domain::{ConfigIssue, UncertaintyDetector};
use serde::{Deserialize, Serialize};

/// Raw uncertainty settings from TOML.
///
/// # Example
///
/// ```toml
/// [uncertainty]
/// enabled = true
/// max_search_results = 3
/// extra_phrases = ["no idea", "beyond my knowledge"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileUncertaintyConfig {
    pub enabled: bool,
    pub max_search_results: usize,
    /// Appended to the built-in hedging phrases
    pub extra_phrases: Vec<String>,
}

impl Default for FileUncertaintyConfig {
    fn default() -> Self {
        let params = AugmentationParams::default();
        Self {
            enabled: params.enabled,
            max_search_results: params.max_search_results,
            extra_phrases: Vec::new(),
        }
    }
}

impl FileUncertaintyConfig {
    pub fn to_params(&self) -> AugmentationParams {
        AugmentationParams {
            enabled: self.enabled,
            max_search_results: self.max_search_results,
        }
    }

    pub fn detector(&self) -> UncertaintyDetector {
        UncertaintyDetector::with_extra(&self.extra_phrases)
    }

    pub fn issues(&self) -> Vec<ConfigIssue> {
        if self.enabled && self.max_search_results == 0 {
            vec![zero_issue("uncertainty.max_search_results")]
        } else {
            vec![]
        }
    }
}
