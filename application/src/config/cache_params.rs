//! Cache parameters for chat responses and model listings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheParams {
    /// Age after which a cached chat response is ignored
    pub ttl: Duration,
    /// Upper bound on cached chat responses
    pub max_entries: usize,
    /// Age after which a backend's model list is fetched again
    pub model_list_ttl: Duration,
}

impl Default for CacheParams {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_entries: 512,
            model_list_ttl: Duration::from_secs(300),
        }
    }
}
