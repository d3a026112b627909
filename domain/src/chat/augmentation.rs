//! Search results used to augment an uncertain answer.

use serde::{Deserialize, Serialize};

/// One search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl SearchHit {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }

    /// A hit with neither title nor snippet carries no context.
    pub fn is_usable(&self) -> bool {
        !self.title.trim().is_empty() || !self.snippet.trim().is_empty()
    }
}

/// Keep at most `limit` usable hits, in order.
pub fn usable_hits(hits: Vec<SearchHit>, limit: usize) -> Vec<SearchHit> {
    hits.into_iter()
        .filter(SearchHit::is_usable)
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_hits_filters_and_limits() {
        let hits = vec![
            SearchHit::new("", "https://a", " "),
            SearchHit::new("One", "https://1", "first"),
            SearchHit::new("Two", "https://2", "second"),
            SearchHit::new("Three", "https://3", "third"),
            SearchHit::new("Four", "https://4", "fourth"),
        ];
        let kept = usable_hits(hits, 3);
        let titles: Vec<_> = kept.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
    }
}
