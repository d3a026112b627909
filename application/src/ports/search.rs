//! Search port
//!
//! Web search used to augment uncertain chat answers.

use async_trait::async_trait;
use parley_domain::SearchHit;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Request(String),

    #[error("Search provider returned an unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Search provider {0} needs an API key")]
    MissingApiKey(&'static str),
}

#[async_trait]
pub trait SearchPort: Send + Sync {
    /// Up to `limit` results for `query`, best first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError>;
}

/// Search that never finds anything; disables augmentation.
pub struct NoSearch;

#[async_trait]
impl SearchPort for NoSearch {
    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        Ok(Vec::new())
    }
}
