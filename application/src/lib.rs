//! Application layer for parley
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{AugmentationParams, CacheParams, GenerationParams, SessionParams};
pub use ports::{
    clock::{Clock, ManualClock, SystemClock},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    inference_gateway::{GatewayError, GenerateRequest, GenerationOptions, InferenceGateway, StreamHandle},
    progress::{NoProgress, ProgressNotifier},
    search::{NoSearch, SearchError, SearchPort},
    transcript_exporter::{ExportError, TranscriptExporter},
};
pub use use_cases::chat::{ChatError, ChatReply, ChatRequest, ChatUseCase};
pub use use_cases::dialogue::{AdvanceOutcome, DialogueError, DialogueUseCase, StartDialogue};
pub use use_cases::model_catalog::ModelCatalog;
pub use use_cases::response_cache::ResponseCache;
pub use use_cases::stream_delivery::{Delivered, StreamDelivery};
