//! Ollama inference gateway implementation

use super::error::{OllamaError, Result};
use super::protocol::{ChatRequest, ErrorBody, TagsResponse};
use super::transport::NdjsonDecoder;
use async_trait::async_trait;
use futures::StreamExt;
use parley_application::{GatewayError, GenerateRequest, InferenceGateway, StreamHandle};
use parley_domain::{BackendId, ModelId, StreamEvent};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const LIST_TIMEOUT: Duration = Duration::from_secs(15);
const STREAM_BUFFER: usize = 64;

/// Gateway to one or more Ollama-compatible runtimes.
///
/// Every call names its backend explicitly; the gateway only maps the name
/// to a base URL. Request deadlines are enforced by the caller, so the HTTP
/// client itself only bounds connection setup.
pub struct OllamaGateway {
    client: reqwest::Client,
    hosts: BTreeMap<BackendId, String>,
}

impl OllamaGateway {
    pub fn new(hosts: BTreeMap<BackendId, String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        info!(
            "OllamaGateway initialized with backends: {}",
            hosts
                .keys()
                .map(BackendId::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self { client, hosts })
    }

    pub fn hosts(&self) -> &BTreeMap<BackendId, String> {
        &self.hosts
    }

    fn host(&self, backend: &BackendId) -> std::result::Result<&str, GatewayError> {
        self.hosts
            .get(backend)
            .map(String::as_str)
            .ok_or_else(|| GatewayError::UnknownBackend(backend.to_string()))
    }
}

#[async_trait]
impl InferenceGateway for OllamaGateway {
    async fn list_models(
        &self,
        backend: &BackendId,
    ) -> std::result::Result<Vec<ModelId>, GatewayError> {
        let host = self.host(backend)?;
        let url = format!("{}/api/tags", host);
        debug!("Listing models from {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(LIST_TIMEOUT)
            .send()
            .await
            .map_err(|e| OllamaError::from_reqwest(host, e))?;

        let response = check_status(response).await?;
        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| OllamaError::from_reqwest(host, e))?;

        Ok(tags
            .models
            .into_iter()
            .map(|m| ModelId::new(m.name))
            .collect())
    }

    async fn generate_stream(
        &self,
        request: GenerateRequest,
    ) -> std::result::Result<StreamHandle, GatewayError> {
        let host = self.host(&request.backend)?.to_string();
        let body = serde_json::to_value(ChatRequest::streaming(
            request.model.as_str(),
            &request.messages,
            request.options,
        ))
        .map_err(|e| GatewayError::InferenceError(e.to_string()))?;

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let cancel = CancellationToken::new();
        let client = self.client.clone();
        let producer_cancel = cancel.clone();
        let model = request.model;

        debug!(
            "Starting stream: backend={}, model={}, messages={}",
            request.backend,
            model,
            request.messages.len()
        );

        tokio::spawn(async move {
            let started = Instant::now();
            let outcome = tokio::select! {
                _ = producer_cancel.cancelled() => {
                    debug!("Stream for {} cancelled, closing request", model);
                    return;
                }
                outcome = pump_chat(&client, &host, &body, &tx) => outcome,
            };

            let event = match outcome {
                Ok((text, reported)) => StreamEvent::Completed {
                    text,
                    elapsed: reported.unwrap_or_else(|| started.elapsed()),
                },
                Err(e) => {
                    warn!("Stream for {} failed: {}", model, e);
                    StreamEvent::Failed(e.into_failure())
                }
            };
            let _ = tx.send(event).await;
        });

        Ok(StreamHandle::new(rx, cancel))
    }
}

/// Issue the chat request and forward each fragment as a delta.
///
/// Returns the full text and the runtime-reported generation time.
async fn pump_chat(
    client: &reqwest::Client,
    host: &str,
    body: &serde_json::Value,
    tx: &mpsc::Sender<StreamEvent>,
) -> Result<(String, Option<Duration>)> {
    let response = client
        .post(format!("{}/api/chat", host))
        .json(body)
        .send()
        .await
        .map_err(|e| OllamaError::from_reqwest(host, e))?;
    let response = check_status(response).await?;

    let mut decoder = NdjsonDecoder::new();
    let mut text = String::new();
    let mut bytes = response.bytes_stream();

    while let Some(chunk) = bytes.next().await {
        let chunk = chunk.map_err(|e| OllamaError::from_reqwest(host, e))?;
        for line in decoder.push(&chunk) {
            let line = line?;
            let content = line.content();
            if !content.is_empty() {
                text.push_str(content);
                // A closed receiver means the handle was dropped; cancellation follows.
                let _ = tx.send(StreamEvent::Delta(content.to_string())).await;
            }
            if line.done {
                return Ok((text, line.total_duration.map(Duration::from_nanos)));
            }
        }
    }

    match decoder.finish().transpose()? {
        Some(line) if line.done => {
            text.push_str(line.content());
            Ok((text, line.total_duration.map(Duration::from_nanos)))
        }
        _ => Err(OllamaError::Api(
            "response ended before the final fragment".to_string(),
        )),
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let raw = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ErrorBody>(&raw)
        .map(|e| e.error)
        .unwrap_or(raw);
    Err(OllamaError::Status {
        status: status.as_u16(),
        body,
    })
}
