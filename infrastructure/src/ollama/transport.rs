//! Newline-delimited JSON framing for streaming responses.
//!
//! HTTP body chunks do not align with JSON lines: one chunk may carry
//! several lines or end mid-line, and a multi-byte character may be split
//! across chunks. [`NdjsonDecoder`] buffers raw bytes and yields only
//! complete lines.

use super::error::{OllamaError, Result};
use super::protocol::ChatChunk;

#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw body bytes; returns every line completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<ChatChunk>> {
        self.buffer.extend_from_slice(bytes);

        let mut decoded = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(chunk) = decode_line(&line[..line.len() - 1]) {
                decoded.push(chunk);
            }
        }
        decoded
    }

    /// Decode whatever remains once the body ends without a trailing newline.
    pub fn finish(&mut self) -> Option<Result<ChatChunk>> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&rest)
    }
}

fn decode_line(line: &[u8]) -> Option<Result<ChatChunk>> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    Some(
        serde_json::from_str::<ChatChunk>(text)
            .map_err(|e| OllamaError::Decode {
                error: e.to_string(),
                raw: text.to_string(),
            })
            .and_then(|chunk| match chunk.error {
                Some(message) => Err(OllamaError::Api(message)),
                None => Ok(chunk),
            }),
    )
}
