//! Wire types for the Ollama HTTP API.
//!
//! - `GET  /api/tags` lists installed models
//! - `POST /api/chat` with `stream: true` answers with newline-delimited
//!   JSON objects, one per generated fragment, the last carrying `done: true`

use parley_application::GenerationOptions;
use parley_domain::Message;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage<'a>>,
    pub stream: bool,
    pub options: WireOptions,
}

impl<'a> ChatRequest<'a> {
    pub fn streaming(model: &'a str, messages: &'a [Message], options: GenerationOptions) -> Self {
        Self {
            model,
            messages: messages.iter().map(WireMessage::from).collect(),
            stream: true,
            options: WireOptions {
                num_ctx: options.context_window,
                temperature: options.temperature,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WireMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            role: message.role.as_str(),
            content: &message.content,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct WireOptions {
    pub num_ctx: u32,
    pub temperature: f32,
}

/// One line of a streaming `/api/chat` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub message: Option<ChunkMessage>,
    #[serde(default)]
    pub done: bool,
    /// Nanoseconds spent generating, present on the final line
    #[serde(default)]
    pub total_duration: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatChunk {
    pub fn content(&self) -> &str {
        self.message.as_ref().map_or("", |m| m.content.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkMessage {
    #[serde(default)]
    pub content: String,
}

/// Body of `GET /api/tags`
#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TagModel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagModel {
    pub name: String,
}

/// Error body returned alongside non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
