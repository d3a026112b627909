//! Cache configuration from TOML (`[cache]` section)

use super::zero_issue;
use parley_application::CacheParams;
use parley_domain::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw cache settings from TOML.
///
/// # Example
///
/// ```toml
/// [cache]
/// ttl_secs = 600
/// max_entries = 1024
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    pub ttl_secs: u64,
    pub max_entries: usize,
    pub model_list_ttl_secs: u64,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        let params = CacheParams::default();
        Self {
            ttl_secs: params.ttl.as_secs(),
            max_entries: params.max_entries,
            model_list_ttl_secs: params.model_list_ttl.as_secs(),
        }
    }
}

impl FileCacheConfig {
    pub fn to_params(&self) -> CacheParams {
        CacheParams {
            ttl: Duration::from_secs(self.ttl_secs),
            max_entries: self.max_entries,
            model_list_ttl: Duration::from_secs(self.model_list_ttl_secs),
        }
    }

    pub fn issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.ttl_secs == 0 {
            issues.push(zero_issue("cache.ttl_secs"));
        }
        if self.max_entries == 0 {
            issues.push(zero_issue("cache.max_entries"));
        }
        issues
    }
}
