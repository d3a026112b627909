//! Model and backend identifiers

use serde::{Deserialize, Serialize};

/// Identifier of a model served by an inference backend (Value Object)
///
/// Local runtimes name models freely (`llama3:8b`, `qwen2.5-coder:1.5b`),
/// so this is an opaque string rather than a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        ModelId::new(s)
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        ModelId::new(s)
    }
}

/// Name of an inference backend (e.g. `ollama`, `kiklop`)
///
/// Every inference call carries one of these explicitly; the gateway
/// resolves it to a host, so sessions against different backends never
/// share ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendId(String);

impl BackendId {
    /// Name of the backend used when none is given
    pub const DEFAULT: &'static str = "ollama";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BackendId {
    fn default() -> Self {
        BackendId::new(Self::DEFAULT)
    }
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BackendId {
    fn from(s: &str) -> Self {
        BackendId::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_display() {
        let model = ModelId::new("llama3:8b");
        assert_eq!(model.to_string(), "llama3:8b");
        assert_eq!(model.as_str(), "llama3:8b");
    }

    #[test]
    fn test_model_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&ModelId::new("mistral")).unwrap();
        assert_eq!(json, "\"mistral\"");
        let back: ModelId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ModelId::new("mistral"));
    }

    #[test]
    fn test_backend_default() {
        assert_eq!(BackendId::default().as_str(), "ollama");
    }
}
