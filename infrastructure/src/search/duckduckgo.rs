//! DuckDuckGo Instant Answer search.
//!
//! Uses the [DuckDuckGo Instant Answer API](https://api.duckduckgo.com/),
//! which needs no API key. It returns an abstract and related topics rather
//! than a full result listing; both are flattened into [`SearchHit`]s.

use async_trait::async_trait;
use parley_application::{SearchError, SearchPort};
use parley_domain::SearchHit;
use std::time::Duration;
use tracing::debug;

/// DuckDuckGo Instant Answer API endpoint (no API key required).
const DDG_API_URL: &str = "https://api.duckduckgo.com/";
const USER_AGENT: &str = "Parley/0.1 (Answer Augmentation)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_endpoint(client, DDG_API_URL)
    }

    pub fn with_endpoint(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SearchPort for DuckDuckGoSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        debug!("DuckDuckGo search: {}", query);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .header("User-Agent", USER_AGENT)
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

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        Ok(parse_instant_answer(&body, limit))
    }
}

/// Flatten an Instant Answer response: the abstract first, then the
/// direct answer, then related topics (nested topic groups included).
fn parse_instant_answer(data: &serde_json::Value, limit: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    if let Some(abstract_text) = data["AbstractText"].as_str()
        && !abstract_text.is_empty()
    {
        let heading = data["Heading"]
            .as_str()
            .filter(|h| !h.is_empty())
            .or_else(|| data["AbstractSource"].as_str())
            .unwrap_or("Summary");
        let url = data["AbstractURL"].as_str().unwrap_or("");
        hits.push(SearchHit::new(heading, url, abstract_text));
    }

    if let Some(answer) = data["Answer"].as_str()
        && !answer.is_empty()
    {
        hits.push(SearchHit::new("Instant Answer", "", answer));
    }

    if let Some(topics) = data["RelatedTopics"].as_array() {
        for topic in topics {
            match topic["Topics"].as_array() {
                Some(group) => hits.extend(group.iter().filter_map(topic_hit)),
                None => hits.extend(topic_hit(topic)),
            }
        }
    }

    hits.truncate(limit);
    hits
}

fn topic_hit(topic: &serde_json::Value) -> Option<SearchHit> {
    let text = topic["Text"].as_str().filter(|t| !t.is_empty())?;
    let url = topic["FirstURL"].as_str().unwrap_or("");
    // Topic text reads "Title - description"
    let title = text.split(" - ").next().unwrap_or(text);
    Some(SearchHit::new(title, url, text))
}
