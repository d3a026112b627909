//! Web search configuration from TOML (`[search]` section)

use crate::search::SearchProvider;
use parley_domain::{ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};

/// Raw search settings from TOML.
///
/// # Example
///
/// ```toml
/// [search]
/// provider = "brave"
/// brave_api_key = "BSA..."
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSearchConfig {
    /// "duckduckgo" or "brave"
    pub provider: String,
    pub brave_api_key: Option<String>,
}

impl Default for FileSearchConfig {
    fn default() -> Self {
        Self {
            provider: SearchProvider::default().as_str().to_string(),
            brave_api_key: None,
        }
    }
}

impl FileSearchConfig {
    /// Parse `provider`, falling back to DuckDuckGo with a warning.
    pub fn parse_provider(&self) -> (SearchProvider, Vec<ConfigIssue>) {
        match self.provider.parse::<SearchProvider>() {
            Ok(provider) => (provider, vec![]),
            Err(_) => (
                SearchProvider::default(),
                vec![ConfigIssue {
                    severity: Severity::Warning,
                    code: ConfigIssueCode::InvalidEnumValue {
                        field: "search.provider".to_string(),
                        value: self.provider.clone(),
                        valid_values: SearchProvider::ALL
                            .iter()
                            .map(|p| p.as_str().to_string())
                            .collect(),
                    },
                    message: format!(
                        "search.provider: unknown value '{}', falling back to '{}'",
                        self.provider,
                        SearchProvider::default().as_str()
                    ),
                }],
            ),
        }
    }

    pub fn issues(&self) -> Vec<ConfigIssue> {
        let (provider, mut issues) = self.parse_provider();
        let key_missing = self
            .brave_api_key
            .as_deref()
            .is_none_or(|k| k.trim().is_empty());
        if provider == SearchProvider::Brave && key_missing {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::MissingValue {
                    field: "search.brave_api_key".to_string(),
                },
                message: "search.brave_api_key: not set, uncertain answers will not be augmented"
                    .to_string(),
            });
        }
        issues
    }
}
