//! Brave Search API adapter (needs a subscription token).

use async_trait::async_trait;
use parley_application::{SearchError, SearchPort};
use parley_domain::SearchHit;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const BRAVE_API_URL: &str = "https://api.search.brave.com/res/v1/web/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct BraveSearch {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl BraveSearch {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: BRAVE_API_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: BraveWeb,
}

#[derive(Debug, Default, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

#[async_trait]
impl SearchPort for BraveSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::MissingApiKey("brave"));
        }
        debug!("Brave search: {}", query);

        let count = limit.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("count", count.as_str())])
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SearchError::Request(format!(
                "Search API returned error: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;
        parse_results(&body, limit)
    }
}

fn parse_results(body: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
    let parsed: BraveResponse =
        serde_json::from_str(body).map_err(|e| SearchError::InvalidResponse(e.to_string()))?;
    Ok(parsed
        .web
        .results
        .into_iter()
        .take(limit)
        .map(|r| SearchHit::new(r.title, r.url, r.description))
        .collect())
}
