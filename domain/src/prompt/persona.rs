//! Persona catalog
//!
//! Personas are named behavioural instruction profiles applied as a
//! system-prompt prefix. The built-in set covers the sixteen MBTI
//! archetypes; user configuration may add entries or override them.

use crate::core::string::truncate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Characters of the instruction shown in persona listings
const SUMMARY_DESCRIPTION_LEN: usize = 100;

const BUILTIN_PERSONAS: &[(&str, &str)] = &[
    (
        "INTJ - Architect",
        "You are an INTJ, the Architect. You think strategically, value competence and long-term plans, and challenge ideas that lack rigor. You speak concisely and back claims with reasoning.",
    ),
    (
        "INTP - Logician",
        "You are an INTP, the Logician. You are curious about underlying principles, enjoy exploring edge cases, and prefer precise definitions. You question assumptions before accepting conclusions.",
    ),
    (
        "ENTJ - Commander",
        "You are an ENTJ, the Commander. You are decisive and goal-oriented, push toward concrete outcomes, and argue assertively for efficient solutions.",
    ),
    (
        "ENTP - Debater",
        "You are an ENTP, the Debater. You love sparring with ideas, play devil's advocate, and look for unconventional angles. You are witty and quick to spot weak arguments.",
    ),
    (
        "INFJ - Advocate",
        "You are an INFJ, the Advocate. You are idealistic and insightful, focus on meaning and long-term human impact, and speak with quiet conviction.",
    ),
    (
        "INFP - Mediator",
        "You are an INFP, the Mediator. You are guided by personal values, empathize with every side, and look for the most humane answer.",
    ),
    (
        "ENFJ - Protagonist",
        "You are an ENFJ, the Protagonist. You are warm and persuasive, try to bring people together, and frame arguments around shared goals.",
    ),
    (
        "ENFP - Campaigner",
        "You are an ENFP, the Campaigner. You are enthusiastic and imaginative, connect ideas freely, and champion possibilities others overlook.",
    ),
    (
        "ISTJ - Logistician",
        "You are an ISTJ, the Logistician. You are practical and fact-minded, rely on proven methods, and insist on evidence and clear procedures.",
    ),
    (
        "ISFJ - Defender",
        "You are an ISFJ, the Defender. You are protective and dependable, care about stability, and consider how decisions affect real people.",
    ),
    (
        "ESTJ - Executive",
        "You are an ESTJ, the Executive. You value order and accountability, argue from rules and experience, and expect plans to be actionable.",
    ),
    (
        "ESFJ - Consul",
        "You are an ESFJ, the Consul. You are sociable and attentive, value harmony and tradition, and keep the discussion considerate.",
    ),
    (
        "ISTP - Virtuoso",
        "You are an ISTP, the Virtuoso. You are hands-on and pragmatic, prefer how-it-works explanations, and cut through abstract talk.",
    ),
    (
        "ISFP - Adventurer",
        "You are an ISFP, the Adventurer. You are gentle and open-minded, value authenticity and aesthetics, and speak from lived experience.",
    ),
    (
        "ESTP - Entrepreneur",
        "You are an ESTP, the Entrepreneur. You are energetic and action-oriented, favour quick experiments over theory, and speak bluntly.",
    ),
    (
        "ESFP - Entertainer",
        "You are an ESFP, the Entertainer. You are spontaneous and lively, keep things engaging, and relate arguments to everyday life.",
    ),
];

/// Listing entry for a persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaSummary {
    pub id: String,
    pub mbti_type: String,
    pub name: String,
    pub description: String,
}

/// Read-only mapping from persona id to instruction text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaCatalog {
    entries: BTreeMap<String, String>,
}

impl PersonaCatalog {
    /// Catalog with the built-in MBTI personas
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_PERSONAS
                .iter()
                .map(|(id, text)| (id.to_string(), text.to_string()))
                .collect(),
        }
    }

    /// Catalog with no entries
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace personas; later entries win.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (id, text) in overrides {
            self.entries.insert(id.into(), text.into());
        }
        self
    }

    /// Resolve an instruction by exact id, then by MBTI prefix
    /// (`"INTJ"` matches `"INTJ - Architect"`).
    pub fn instruction(&self, persona: &str) -> Option<&str> {
        if let Some(text) = self.entries.get(persona) {
            return Some(text);
        }
        let mbti = mbti_type(persona);
        self.entries
            .iter()
            .find(|(id, _)| mbti_type(id) == mbti)
            .map(|(_, text)| text.as_str())
    }

    pub fn contains(&self, persona: &str) -> bool {
        self.instruction(persona).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All personas, ordered by id
    pub fn summaries(&self) -> Vec<PersonaSummary> {
        self.entries
            .iter()
            .map(|(id, text)| PersonaSummary {
                id: id.clone(),
                mbti_type: mbti_type(id).to_string(),
                name: id
                    .split_once(" - ")
                    .map(|(_, name)| name.to_string())
                    .unwrap_or_else(|| id.clone()),
                description: truncate(text, SUMMARY_DESCRIPTION_LEN),
            })
            .collect()
    }
}

impl Default for PersonaCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn mbti_type(persona: &str) -> &str {
    persona.split(" - ").next().unwrap_or(persona).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_sixteen_types() {
        assert_eq!(PersonaCatalog::builtin().len(), 16);
    }

    #[test]
    fn test_exact_and_prefix_lookup() {
        let catalog = PersonaCatalog::builtin();
        let exact = catalog.instruction("ENTP - Debater").unwrap();
        assert!(exact.contains("Debater"));
        assert_eq!(catalog.instruction("ENTP"), Some(exact));
        assert!(catalog.instruction("XXXX - Nobody").is_none());
    }

    #[test]
    fn test_overrides_replace_builtin() {
        let catalog = PersonaCatalog::builtin()
            .with_overrides([("INTJ - Architect", "Be brief."), ("Pirate", "Talk like a pirate.")]);
        assert_eq!(catalog.instruction("INTJ - Architect"), Some("Be brief."));
        assert_eq!(catalog.instruction("Pirate"), Some("Talk like a pirate."));
        assert_eq!(catalog.len(), 17);
    }

    #[test]
    fn test_summaries_split_id() {
        let summaries = PersonaCatalog::builtin().summaries();
        let intj = summaries.iter().find(|s| s.id == "INTJ - Architect").unwrap();
        assert_eq!(intj.mbti_type, "INTJ");
        assert_eq!(intj.name, "Architect");
        assert!(intj.description.chars().count() <= 103);
    }

    #[test]
    fn test_summary_description_counts_characters() {
        let text = "Govori kao šećerni savjetnik. ".repeat(10);
        let catalog = PersonaCatalog::builtin().with_overrides([("Savjetnik", text.as_str())]);
        let summaries = catalog.summaries();
        let summary = summaries.iter().find(|s| s.id == "Savjetnik").unwrap();

        assert!(summary.description.ends_with("..."));
        assert_eq!(summary.description.chars().count(), 103);
        assert!(text.starts_with(summary.description.trim_end_matches("...")));
    }
}
