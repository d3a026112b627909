//! Prompt and inference-stream domain.
//!
//! - [`entities::Message`]: a single role-tagged prompt message
//! - [`stream::StreamEvent`]: one event of a streaming model response
//! - [`fingerprint::Fingerprint`]: cache key for a `(model, prompt)` pair

pub mod entities;
pub mod fingerprint;
pub mod stream;
