//! Ollama adapter: model listing and streaming chat over HTTP

pub mod error;
pub mod gateway;
pub mod protocol;
pub mod transport;

pub use error::OllamaError;
pub use gateway::OllamaGateway;
