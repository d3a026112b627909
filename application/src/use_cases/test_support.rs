//! Scripted collaborators shared by use case tests.

use crate::ports::inference_gateway::{GatewayError, GenerateRequest, InferenceGateway, StreamHandle};
use crate::ports::search::{SearchError, SearchPort};
use async_trait::async_trait;
use parley_domain::{BackendId, InferenceFailure, ModelId, SearchHit, StreamEvent};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// What the next `generate_stream` call does
pub(crate) enum Script {
    /// Stream the text as whitespace-separated chunks, then complete.
    Reply(&'static str),
    /// Fail on the stream.
    Fail(InferenceFailure),
    /// Refuse to start the call.
    Refuse(GatewayError),
    /// Never produce anything until cancelled.
    Hang,
}

pub(crate) struct ScriptedGateway {
    models: Mutex<Vec<ModelId>>,
    scripts: Mutex<VecDeque<Script>>,
    pub requests: Mutex<Vec<GenerateRequest>>,
    pub producer_tokens: Mutex<Vec<CancellationToken>>,
}

impl ScriptedGateway {
    pub fn new(models: &[&str], scripts: Vec<Script>) -> Self {
        Self {
            models: Mutex::new(models.iter().map(|m| ModelId::new(*m)).collect()),
            scripts: Mutex::new(VecDeque::from(scripts)),
            requests: Mutex::new(Vec::new()),
            producer_tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn set_models(&self, models: &[&str]) {
        *self.models.lock().unwrap() = models.iter().map(|m| ModelId::new(*m)).collect();
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> GenerateRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl InferenceGateway for ScriptedGateway {
    async fn list_models(&self, _backend: &BackendId) -> Result<Vec<ModelId>, GatewayError> {
        Ok(self.models.lock().unwrap().clone())
    }

    async fn generate_stream(&self, request: GenerateRequest) -> Result<StreamHandle, GatewayError> {
        self.requests.lock().unwrap().push(request);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Fail(InferenceFailure::InferenceError(
                "no more scripted replies".to_string(),
            )));

        let (tx, rx) = mpsc::channel(16);
        let token = CancellationToken::new();
        self.producer_tokens.lock().unwrap().push(token.clone());

        match script {
            Script::Refuse(err) => return Err(err),
            Script::Reply(text) => {
                tokio::spawn(async move {
                    for (i, word) in text.split(' ').enumerate() {
                        let chunk = if i == 0 { word.to_string() } else { format!(" {}", word) };
                        if tx.send(StreamEvent::Delta(chunk)).await.is_err() {
                            return;
                        }
                    }
                    let _ = tx
                        .send(StreamEvent::Completed {
                            text: text.to_string(),
                            elapsed: Duration::from_millis(10),
                        })
                        .await;
                });
            }
            Script::Fail(failure) => {
                tokio::spawn(async move {
                    let _ = tx.send(StreamEvent::Failed(failure)).await;
                });
            }
            Script::Hang => {
                let watch = token.clone();
                tokio::spawn(async move {
                    let _ = tx.send(StreamEvent::Delta("partial".to_string())).await;
                    watch.cancelled().await;
                    drop(tx);
                });
            }
        }
        Ok(StreamHandle::new(rx, token))
    }
}

pub(crate) struct ScriptedSearch {
    pub hits: Result<Vec<SearchHit>, SearchError>,
    pub queries: Mutex<Vec<(String, usize)>>,
}

impl ScriptedSearch {
    pub fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits: Ok(hits),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            hits: Err(SearchError::Request("offline".to_string())),
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SearchPort for ScriptedSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        self.queries.lock().unwrap().push((query.to_string(), limit));
        self.hits.clone()
    }
}
