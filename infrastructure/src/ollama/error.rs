//! Error types for the Ollama adapter

use parley_application::GatewayError;
use parley_domain::InferenceFailure;
use thiserror::Error;

/// Result type alias for Ollama operations
pub type Result<T> = std::result::Result<T, OllamaError>;

/// Errors that can occur when talking to an Ollama-compatible runtime
#[derive(Error, Debug)]
pub enum OllamaError {
    #[error("Cannot reach {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response line: {error}\nRaw line: {raw}")]
    Decode { error: String, raw: String },

    #[error("Runtime reported an error: {0}")]
    Api(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl OllamaError {
    /// Classify a reqwest failure against `host`.
    pub fn from_reqwest(host: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OllamaError::Timeout
        } else if err.is_connect() {
            OllamaError::Connect {
                host: host.to_string(),
                source: err,
            }
        } else {
            OllamaError::Request(err)
        }
    }

    /// Map onto the failure kinds a stream can report.
    pub fn into_failure(self) -> InferenceFailure {
        match self {
            OllamaError::Connect { .. } => InferenceFailure::BackendUnavailable(self.to_string()),
            OllamaError::Timeout => InferenceFailure::Timeout,
            OllamaError::Status { status: 404, body } => InferenceFailure::ModelNotFound(body),
            OllamaError::Api(message) if message.contains("not found") => {
                InferenceFailure::ModelNotFound(message)
            }
            other => InferenceFailure::InferenceError(other.to_string()),
        }
    }
}

impl From<OllamaError> for GatewayError {
    fn from(err: OllamaError) -> Self {
        err.into_failure().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_maps_to_not_available() {
        let err = OllamaError::Status {
            status: 404,
            body: "model 'ghost' not found".to_string(),
        };
        match GatewayError::from(err) {
            GatewayError::ModelNotAvailable(detail) => assert!(detail.contains("ghost")),
            other => panic!("unexpected {:?}", other),
        }

        let err = OllamaError::Api("model \"ghost\" not found, try pulling it first".to_string());
        assert!(matches!(
            GatewayError::from(err),
            GatewayError::ModelNotAvailable(_)
        ));
    }

    #[test]
    fn test_other_status_maps_to_inference_error() {
        let err = OllamaError::Status {
            status: 500,
            body: "out of memory".to_string(),
        };
        match GatewayError::from(err) {
            GatewayError::InferenceError(detail) => assert!(detail.contains("out of memory")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_timeout_maps_to_timeout() {
        assert_eq!(GatewayError::from(OllamaError::Timeout), GatewayError::Timeout);
    }
}
