//! Cache fingerprints for `(model, prompt)` pairs.
//!
//! A fingerprint is the SHA-256 of a canonical JSON rendering of the model
//! id followed by the ordered prompt messages. Object keys are emitted in
//! sorted order, so two structurally equal prompts always hash the same
//! regardless of how their fields were populated.

use crate::core::model::ModelId;
use crate::session::entities::Message;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stable cache key derived from a model id and an ordered prompt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of `(model, messages)`.
    pub fn of(model: &ModelId, messages: &[Message]) -> Self {
        let canonical = canonical_json(&serde_json::json!([model, messages]));
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render JSON with object keys sorted at every depth; array order is kept.
fn canonical_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let fields: Vec<String> = keys
                .into_iter()
                .map(|k| {
                    format!(
                        "{}:{}",
                        serde_json::Value::String(k.clone()),
                        canonical_json(&map[k])
                    )
                })
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        serde_json::Value::Array(items) => {
            let items: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> Vec<Message> {
        vec![Message::system("be brief"), Message::user("what is rust?")]
    }

    #[test]
    fn test_same_input_same_fingerprint() {
        let model = ModelId::new("llama3");
        assert_eq!(Fingerprint::of(&model, &prompt()), Fingerprint::of(&model, &prompt()));
    }

    #[test]
    fn test_model_changes_fingerprint() {
        let a = Fingerprint::of(&ModelId::new("llama3"), &prompt());
        let b = Fingerprint::of(&ModelId::new("mistral"), &prompt());
        assert_ne!(a, b);
    }

    #[test]
    fn test_message_order_matters() {
        let model = ModelId::new("llama3");
        let mut reversed = prompt();
        reversed.reverse();
        assert_ne!(Fingerprint::of(&model, &prompt()), Fingerprint::of(&model, &reversed));
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let a: serde_json::Value =
            serde_json::from_str(r#"{"role":"user","content":"x"}"#).unwrap();
        let b: serde_json::Value =
            serde_json::from_str(r#"{"content":"x","role":"user"}"#).unwrap();
        assert_eq!(canonical_json(&a), canonical_json(&b));
        assert_eq!(canonical_json(&a), r#"{"content":"x","role":"user"}"#);
    }

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let fp = Fingerprint::of(&ModelId::new("llama3"), &prompt());
        assert_eq!(fp.as_str().len(), 64);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
