//! Streaming delivery: drive one inference stream to completion.
//!
//! Chunks are forwarded to a [`ProgressNotifier`] as they arrive and
//! concatenated into the final text. The stream stops on completion,
//! failure, the caller's cancel token, or the deadline, whichever comes
//! first. On cancel and timeout the producer is told to close the request.

use crate::ports::inference_gateway::{GatewayError, StreamHandle};
use crate::ports::progress::ProgressNotifier;
use parley_domain::{ModelId, StreamEvent};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Result of a fully drained stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    /// Every chunk in emission order
    pub text: String,
    /// Backend-reported generation time
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct StreamDelivery {
    timeout: Duration,
}

impl StreamDelivery {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Drain `handle`, forwarding each chunk to `progress`.
    pub async fn drive(
        &self,
        mut handle: StreamHandle,
        model: &ModelId,
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<Delivered, GatewayError> {
        let deadline = tokio::time::sleep_until(Instant::now() + self.timeout);
        tokio::pin!(deadline);

        let mut text = String::new();
        progress.on_stream_start(model);

        let result = loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Stream from {} cancelled by caller", model);
                    handle.cancel();
                    break Err(GatewayError::Cancelled);
                }
                _ = &mut deadline => {
                    warn!("Stream from {} exceeded {:?}", model, self.timeout);
                    handle.cancel();
                    break Err(GatewayError::Timeout);
                }
                event = handle.next() => event,
            };

            match event {
                Some(StreamEvent::Delta(chunk)) => {
                    progress.on_stream_chunk(model, &chunk);
                    text.push_str(&chunk);
                }
                Some(StreamEvent::Completed {
                    text: full,
                    elapsed,
                }) => {
                    if text.is_empty() {
                        text = full;
                    }
                    break Ok(Delivered { text, elapsed });
                }
                Some(StreamEvent::Failed(failure)) => break Err(failure.into()),
                None => {
                    break Err(GatewayError::InferenceError(
                        "stream closed before completion".to_string(),
                    ));
                }
            }
        };

        progress.on_stream_end(model);
        result
    }
}
