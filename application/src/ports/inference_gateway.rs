//! Inference gateway port
//!
//! Defines the interface for talking to a local model runtime.

use async_trait::async_trait;
use parley_domain::{BackendId, InferenceFailure, Message, ModelId, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Errors that can occur during gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Timeout")]
    Timeout,

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("Cancelled")]
    Cancelled,
}

impl From<InferenceFailure> for GatewayError {
    fn from(failure: InferenceFailure) -> Self {
        match failure {
            InferenceFailure::BackendUnavailable(detail) => GatewayError::BackendUnavailable(detail),
            InferenceFailure::Timeout => GatewayError::Timeout,
            InferenceFailure::ModelNotFound(detail) => GatewayError::ModelNotAvailable(detail),
            InferenceFailure::InferenceError(detail) => GatewayError::InferenceError(detail),
        }
    }
}

/// Sampling options passed with every generate call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    /// Context window size in tokens (`num_ctx`)
    pub context_window: u32,
    pub temperature: f32,
}

/// One streaming generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Explicit backend selector; never ambient state
    pub backend: BackendId,
    pub model: ModelId,
    pub messages: Vec<Message>,
    pub options: GenerationOptions,
}

/// Gateway to a model runtime
///
/// This port defines how the application layer reaches the inference engine.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Models currently installed on `backend`
    async fn list_models(&self, backend: &BackendId) -> Result<Vec<ModelId>, GatewayError>;

    /// Start a streaming generation.
    ///
    /// Connection failures may be reported here or as a
    /// [`StreamEvent::Failed`] on the returned handle.
    async fn generate_stream(&self, request: GenerateRequest) -> Result<StreamHandle, GatewayError>;
}

/// Handle for receiving streaming events from one generate call.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` plus the cancellation token the
/// producer watches. Dropping the handle cancels the producer, which closes
/// the underlying request.
pub struct StreamHandle {
    receiver: mpsc::Receiver<StreamEvent>,
    cancel: CancellationToken,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>, cancel: CancellationToken) -> Self {
        Self { receiver, cancel }
    }

    /// Handle whose producer does not watch for cancellation.
    pub fn from_receiver(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self::new(receiver, CancellationToken::new())
    }

    /// Pull the next event; `None` once the producer is gone.
    pub async fn next(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    /// Ask the producer to stop and release the backend request.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
