//! Web search adapters used to augment uncertain chat answers.
//!
//! | Provider | Key needed | Notes |
//! |----------|:---:|-------|
//! | `duckduckgo` | No | Instant answers and related topics |
//! | `brave` | Yes | Full web results; falls back to DuckDuckGo on failure |

mod brave;
mod duckduckgo;

pub use brave::BraveSearch;
pub use duckduckgo::DuckDuckGoSearch;

use async_trait::async_trait;
use parley_application::{SearchError, SearchPort};
use parley_domain::SearchHit;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

/// Which search backend answers augmentation queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchProvider {
    #[default]
    DuckDuckGo,
    Brave,
}

impl SearchProvider {
    pub const ALL: [SearchProvider; 2] = [SearchProvider::DuckDuckGo, SearchProvider::Brave];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchProvider::DuckDuckGo => "duckduckgo",
            SearchProvider::Brave => "brave",
        }
    }
}

impl FromStr for SearchProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "duckduckgo" | "ddg" => Ok(SearchProvider::DuckDuckGo),
            "brave" => Ok(SearchProvider::Brave),
            other => Err(format!("unknown search provider: {}", other)),
        }
    }
}

/// Try `primary`; on error, ask `fallback` instead.
pub struct FallbackSearch {
    primary: Arc<dyn SearchPort>,
    fallback: Arc<dyn SearchPort>,
}

impl FallbackSearch {
    pub fn new(primary: Arc<dyn SearchPort>, fallback: Arc<dyn SearchPort>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl SearchPort for FallbackSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        match self.primary.search(query, limit).await {
            Ok(hits) => Ok(hits),
            Err(e) => {
                warn!("Primary search failed ({}), using fallback", e);
                self.fallback.search(query, limit).await
            }
        }
    }
}

/// Build the search port for `provider`.
///
/// Brave without a key degrades to DuckDuckGo.
pub fn build_search(provider: SearchProvider, brave_api_key: Option<&str>) -> Arc<dyn SearchPort> {
    let client = reqwest::Client::new();
    let duckduckgo: Arc<dyn SearchPort> = Arc::new(DuckDuckGoSearch::new(client.clone()));

    match (provider, brave_api_key.map(str::trim).filter(|k| !k.is_empty())) {
        (SearchProvider::Brave, Some(key)) => Arc::new(FallbackSearch::new(
            Arc::new(BraveSearch::new(client, key)),
            duckduckgo,
        )),
        (SearchProvider::Brave, None) => {
            warn!("Brave search selected without an API key, using DuckDuckGo");
            duckduckgo
        }
        (SearchProvider::DuckDuckGo, _) => duckduckgo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        result: Result<Vec<SearchHit>, SearchError>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(result: Result<Vec<SearchHit>, SearchError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SearchPort for Fixed {
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<SearchHit>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("Brave".parse::<SearchProvider>(), Ok(SearchProvider::Brave));
        assert_eq!("ddg".parse::<SearchProvider>(), Ok(SearchProvider::DuckDuckGo));
        assert!("bing".parse::<SearchProvider>().is_err());
    }

    #[tokio::test]
    async fn test_fallback_used_on_error() {
        let primary = Fixed::new(Err(SearchError::Request("HTTP 429".to_string())));
        let fallback = Fixed::new(Ok(vec![SearchHit::new("t", "l", "s")]));
        let search = FallbackSearch::new(primary.clone(), fallback.clone());

        let hits = search.search("q", 3).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_skipped_on_success() {
        let primary = Fixed::new(Ok(vec![]));
        let fallback = Fixed::new(Ok(vec![SearchHit::new("t", "l", "s")]));
        let search = FallbackSearch::new(primary, fallback.clone());

        assert!(search.search("q", 3).await.unwrap().is_empty());
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }
}
