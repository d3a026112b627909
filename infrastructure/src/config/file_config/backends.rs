//! Inference backend configuration from TOML (`[backends]` section)

use parley_domain::{BackendId, ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw backend configuration from TOML.
///
/// # Example
///
/// ```toml
/// [backends]
/// default = "ollama"
///
/// [backends.hosts]
/// ollama = "http://localhost:11434"
/// kiklop = "http://gpu-box:11434"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendsConfig {
    /// Backend used when a participant or chat request names none
    pub default: String,
    /// Backend name to base URL
    pub hosts: BTreeMap<String, String>,
}

impl Default for FileBackendsConfig {
    fn default() -> Self {
        let mut hosts = BTreeMap::new();
        hosts.insert(
            "ollama".to_string(),
            "http://localhost:11434".to_string(),
        );
        hosts.insert(
            "kiklop".to_string(),
            "http://localhost:11435".to_string(),
        );
        Self {
            default: BackendId::DEFAULT.to_string(),
            hosts,
        }
    }
}

impl FileBackendsConfig {
    pub fn default_backend(&self) -> BackendId {
        BackendId::new(self.default.trim())
    }

    /// Host table keyed by backend id, with trailing slashes removed.
    pub fn host_table(&self) -> BTreeMap<BackendId, String> {
        self.hosts
            .iter()
            .map(|(name, url)| {
                (
                    BackendId::new(name.trim()),
                    url.trim().trim_end_matches('/').to_string(),
                )
            })
            .collect()
    }

    pub fn contains(&self, backend: &str) -> bool {
        self.hosts.contains_key(backend.trim())
    }

    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if !self.contains(&self.default) {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::UnknownBackend {
                    name: self.default.clone(),
                },
                message: format!(
                    "backends.default: '{}' has no entry in [backends.hosts]",
                    self.default
                ),
            });
        }

        for (name, url) in &self.hosts {
            if url.trim().is_empty() {
                issues.push(ConfigIssue {
                    severity: Severity::Error,
                    code: ConfigIssueCode::UnknownBackend { name: name.clone() },
                    message: format!("backends.hosts.{}: base URL is empty", name),
                });
            }
        }

        issues
    }
}
