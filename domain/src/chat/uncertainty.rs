//! Hedging-phrase detector for chat answers.

/// Built-in hedging phrases, lowercase
pub const DEFAULT_PHRASES: [&str; 10] = [
    "i don't have enough information",
    "i'm not aware of",
    "i cannot confirm",
    "i don't know exactly",
    "i am not familiar with",
    "i cannot find",
    "i have no information",
    "is not available",
    "is not known",
    "i have no data",
];

/// Classifies a completed response as confident or hedging.
///
/// Any phrase occurring anywhere in the text (case-insensitive) marks it
/// uncertain. No scoring, no partial matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncertaintyDetector {
    phrases: Vec<String>,
}

impl UncertaintyDetector {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Built-in phrases plus `extra`.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut detector = Self::default();
        detector.phrases.extend(
            extra
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty()),
        );
        detector
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn is_uncertain(&self, response: &str) -> bool {
        let lower = response.to_lowercase();
        self.phrases.iter().any(|p| lower.contains(p.as_str()))
    }
}

impl Default for UncertaintyDetector {
    fn default() -> Self {
        Self::new(DEFAULT_PHRASES)
    }
}
