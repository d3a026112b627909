//! Chat use case
//!
//! One question to one model, with optional document grounding, response
//! caching, and a single search-augmented re-query when the answer hedges.

use crate::config::{AugmentationParams, GenerationParams};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::inference_gateway::{GatewayError, GenerateRequest, InferenceGateway};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::search::SearchPort;
use crate::use_cases::model_catalog::ModelCatalog;
use crate::use_cases::response_cache::ResponseCache;
use crate::use_cases::stream_delivery::{Delivered, StreamDelivery};
use parley_domain::{
    BackendId, ChatGrounding, Fingerprint, Message, ModelId, PromptTemplate, UncertaintyDetector,
    usable_hits,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur during a chat request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Timed out waiting for the model")]
    Timeout,

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("Message is empty")]
    EmptyMessage,
}

impl From<GatewayError> for ChatError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::BackendUnavailable(detail) => ChatError::BackendUnavailable(detail),
            GatewayError::UnknownBackend(name) => {
                ChatError::BackendUnavailable(format!("unknown backend '{}'", name))
            }
            GatewayError::Timeout => ChatError::Timeout,
            GatewayError::InferenceError(detail) => ChatError::InferenceError(detail),
            GatewayError::ModelNotAvailable(model) => ChatError::ModelNotAvailable(model),
            GatewayError::Cancelled => ChatError::Cancelled,
        }
    }
}

/// Input for the chat use case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: ModelId,
    #[serde(default)]
    pub source: BackendId,
    pub message: String,
    /// Text extracted from an uploaded document
    #[serde(default)]
    pub document_context: Option<String>,
    /// A document attached earlier in the chat
    #[serde(default)]
    pub chat_document: Option<String>,
    /// Instruction sent as the leading system message
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Earlier turns of this conversation, oldest first
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

fn default_use_cache() -> bool {
    true
}

impl ChatRequest {
    pub fn new(model: impl Into<ModelId>, message: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            source: BackendId::default(),
            message: message.into(),
            document_context: None,
            chat_document: None,
            system_prompt: None,
            history: Vec::new(),
            use_cache: true,
        }
    }

    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system_prompt = Some(instruction.into());
        self
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    pub fn with_source(mut self, source: BackendId) -> Self {
        self.source = source;
        self
    }

    pub fn with_document(mut self, text: impl Into<String>) -> Self {
        self.document_context = Some(text.into());
        self
    }

    pub fn with_chat_document(mut self, text: impl Into<String>) -> Self {
        self.chat_document = Some(text.into());
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    /// Document context wins over a chat document.
    fn grounding(&self) -> Option<ChatGrounding<'_>> {
        match (&self.document_context, &self.chat_document) {
            (Some(doc), _) if !doc.trim().is_empty() => Some(ChatGrounding::Document(doc)),
            (_, Some(doc)) if !doc.trim().is_empty() => Some(ChatGrounding::ChatDocument(doc)),
            _ => None,
        }
    }
}

/// Output of the chat use case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub model: ModelId,
    pub source: BackendId,
    /// Served from the response cache without calling the model
    pub cached: bool,
    /// Replaced by a search-augmented second answer
    pub enhanced: bool,
    pub processing_time: Duration,
}

/// Use case for single-model chat
pub struct ChatUseCase<G: InferenceGateway + 'static, S: SearchPort + ?Sized + 'static> {
    gateway: Arc<G>,
    catalog: Arc<ModelCatalog<G>>,
    search: Arc<S>,
    cache: Arc<ResponseCache>,
    detector: UncertaintyDetector,
    augmentation: AugmentationParams,
    generation: GenerationParams,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl<G: InferenceGateway + 'static, S: SearchPort + ?Sized + 'static> ChatUseCase<G, S> {
    pub fn new(
        gateway: Arc<G>,
        catalog: Arc<ModelCatalog<G>>,
        search: Arc<S>,
        cache: Arc<ResponseCache>,
    ) -> Self {
        Self {
            gateway,
            catalog,
            search,
            cache,
            detector: UncertaintyDetector::default(),
            augmentation: AugmentationParams::default(),
            generation: GenerationParams::default(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_detector(mut self, detector: UncertaintyDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_augmentation(mut self, params: AugmentationParams) -> Self {
        self.augmentation = params;
        self
    }

    pub fn with_generation(mut self, params: GenerationParams) -> Self {
        self.generation = params;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, request: ChatRequest) -> Result<ChatReply, ChatError> {
        self.execute_with_progress(request, &NoProgress, &CancellationToken::new())
            .await
    }

    /// Execute the use case with progress callbacks and cancellation
    pub async fn execute_with_progress(
        &self,
        request: ChatRequest,
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<ChatReply, ChatError> {
        let started = Instant::now();
        if request.message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        self.catalog.require(&request.source, &request.model).await?;

        let messages = PromptTemplate::chat_messages(
            request.system_prompt.as_deref(),
            &request.history,
            &request.message,
            request.grounding(),
        );
        let key = Fingerprint::of(&request.model, &messages);

        if request.use_cache
            && let Some(response) = self.cache.get_by_key(&key)
        {
            debug!("Cache hit for {} ({})", request.model, key);
            return Ok(self.reply(&request, response, true, false, started));
        }

        let first = self
            .generate(&request, messages.clone(), progress, cancel)
            .await?;

        let mut response = first.text;
        let mut enhanced = false;
        if self.augmentation.enabled && self.detector.is_uncertain(&response) {
            info!("Answer from {} hedges; trying search augmentation", request.model);
            if let Some(better) = self.augment(&request, &messages, progress, cancel).await? {
                response = better;
                enhanced = true;
            }
        }

        if request.use_cache {
            self.cache.put_by_key(key, response.clone());
        }

        self.conversation_logger.log(ConversationEvent::new(
            if enhanced { "chat_augmented" } else { "chat_response" },
            serde_json::json!({
                "model": request.model.as_str(),
                "source": request.source.as_str(),
                "message": request.message,
                "response": response,
                "elapsed_ms": first.elapsed.as_millis() as u64,
            }),
        ));

        Ok(self.reply(&request, response, false, enhanced, started))
    }

    /// One augmentation cycle. `Ok(None)` keeps the original answer.
    async fn augment(
        &self,
        request: &ChatRequest,
        messages: &[Message],
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, ChatError> {
        progress.on_augmenting(&request.message);
        let limit = self.augmentation.max_search_results;

        let hits = match self.search.search(&request.message, limit).await {
            Ok(hits) => usable_hits(hits, limit),
            Err(e) => {
                warn!("Search for augmentation failed: {}", e);
                return Ok(None);
            }
        };
        if hits.is_empty() {
            debug!("Search returned nothing usable; keeping original answer");
            return Ok(None);
        }

        let mut augmented = messages.to_vec();
        augmented.push(Message::user(PromptTemplate::search_augmented(
            &request.message,
            &hits,
        )));

        match self.generate(request, augmented, progress, cancel).await {
            Ok(delivered) => Ok(Some(delivered.text)),
            Err(ChatError::Cancelled) => Err(ChatError::Cancelled),
            Err(e) => {
                warn!("Augmented re-query failed, keeping original answer: {}", e);
                Ok(None)
            }
        }
    }

    async fn generate(
        &self,
        request: &ChatRequest,
        messages: Vec<Message>,
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<Delivered, ChatError> {
        let handle = self
            .gateway
            .generate_stream(GenerateRequest {
                backend: request.source.clone(),
                model: request.model.clone(),
                messages,
                options: self.generation.chat_options(),
            })
            .await?;

        Ok(StreamDelivery::new(self.generation.request_timeout)
            .drive(handle, &request.model, progress, cancel)
            .await?)
    }

    fn reply(
        &self,
        request: &ChatRequest,
        response: String,
        cached: bool,
        enhanced: bool,
        started: Instant,
    ) -> ChatReply {
        ChatReply {
            response,
            model: request.model.clone(),
            source: request.source.clone(),
            cached,
            enhanced,
            processing_time: started.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheParams;
    use crate::ports::clock::{Clock, ManualClock};
    use crate::ports::search::NoSearch;
    use crate::use_cases::test_support::{Script, ScriptedGateway, ScriptedSearch};
    use chrono::Utc;
    use parley_domain::{InferenceFailure, Role, SearchHit};

    const HEDGE: &str = "I cannot confirm who won.";

    struct Fixture<S: SearchPort + 'static> {
        use_case: ChatUseCase<ScriptedGateway, S>,
        gateway: Arc<ScriptedGateway>,
        search: Arc<S>,
        cache: Arc<ResponseCache>,
        clock: Arc<ManualClock>,
    }

    fn fixture<S: SearchPort + 'static>(scripts: Vec<Script>, search: S) -> Fixture<S> {
        let gateway = Arc::new(ScriptedGateway::new(&["llama3:latest"], scripts));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let shared_clock: Arc<dyn Clock> = clock.clone();
        let catalog = Arc::new(ModelCatalog::new(
            gateway.clone(),
            shared_clock.clone(),
            Duration::from_secs(300),
        ));
        let cache = Arc::new(ResponseCache::new(&CacheParams::default(), shared_clock));
        let search = Arc::new(search);
        let use_case = ChatUseCase::new(gateway.clone(), catalog, search.clone(), cache.clone());
        Fixture {
            use_case,
            gateway,
            search,
            cache,
            clock,
        }
    }

    fn hits() -> Vec<SearchHit> {
        vec![
            SearchHit::new("Result one", "https://one", "first snippet"),
            SearchHit::new("Result two", "https://two", "second snippet"),
            SearchHit::new("Result three", "https://three", "third snippet"),
            SearchHit::new("Result four", "https://four", "fourth snippet"),
        ]
    }

    #[tokio::test]
    async fn test_plain_answer() {
        let f = fixture(vec![Script::Reply("Rust is a language.")], NoSearch);
        let reply = f.use_case.execute(ChatRequest::new("llama3", "What is Rust?")).await.unwrap();

        assert_eq!(reply.response, "Rust is a language.");
        assert!(!reply.cached);
        assert!(!reply.enhanced);
        let request = f.gateway.last_request();
        assert_eq!(request.messages, vec![Message::user("What is Rust?")]);
        assert_eq!(request.options.context_window, 1024);
    }

    #[tokio::test]
    async fn test_cache_hit_within_ttl_skips_inference() {
        let f = fixture(
            vec![Script::Reply("first"), Script::Reply("second")],
            NoSearch,
        );
        let request = ChatRequest::new("llama3", "Hello?");

        f.use_case.execute(request.clone()).await.unwrap();
        f.clock.advance(chrono::Duration::seconds(200));
        let reply = f.use_case.execute(request.clone()).await.unwrap();
        assert!(reply.cached);
        assert_eq!(reply.response, "first");
        assert_eq!(f.gateway.request_count(), 1);

        f.clock.advance(chrono::Duration::seconds(200));
        let reply = f.use_case.execute(request).await.unwrap();
        assert!(!reply.cached);
        assert_eq!(reply.response, "second");
        assert_eq!(f.gateway.request_count(), 2);
    }

    #[tokio::test]
    async fn test_use_cache_false_always_calls_model() {
        let f = fixture(vec![Script::Reply("a"), Script::Reply("b")], NoSearch);
        let request = ChatRequest::new("llama3", "Hello?").without_cache();
        f.use_case.execute(request.clone()).await.unwrap();
        let reply = f.use_case.execute(request).await.unwrap();
        assert_eq!(reply.response, "b");
        assert!(f.cache.is_empty());
    }

    #[tokio::test]
    async fn test_uncertain_answer_is_augmented_once() {
        let f = fixture(
            vec![Script::Reply(HEDGE), Script::Reply("I cannot confirm, still unsure.")],
            ScriptedSearch::with_hits(hits()),
        );
        let reply = f.use_case.execute(ChatRequest::new("llama3", "Who won?")).await.unwrap();

        // Second answer replaces the first even though it also hedges.
        assert!(reply.enhanced);
        assert_eq!(reply.response, "I cannot confirm, still unsure.");
        assert_eq!(f.gateway.request_count(), 2);
        assert_eq!(
            f.search.queries.lock().unwrap().clone(),
            vec![("Who won?".to_string(), 3)]
        );

        let augmented = f.gateway.last_request().messages;
        assert_eq!(augmented.len(), 2);
        assert_eq!(augmented[0], Message::user("Who won?"));
        assert_eq!(augmented[1].role, Role::User);
        assert!(augmented[1].content.starts_with("Who won?\n\nContext from web search:\n1. Result one"));
        assert!(augmented[1].content.contains("3. Result three"));
        assert!(!augmented[1].content.contains("Result four"));

        // Cached under the original prompt.
        let cached = f
            .cache
            .get(&ModelId::new("llama3"), &[Message::user("Who won?")]);
        assert_eq!(cached.as_deref(), Some("I cannot confirm, still unsure."));
    }

    #[tokio::test]
    async fn test_no_search_results_keeps_original() {
        let f = fixture(vec![Script::Reply(HEDGE)], ScriptedSearch::with_hits(vec![]));
        let reply = f.use_case.execute(ChatRequest::new("llama3", "Who won?")).await.unwrap();
        assert!(!reply.enhanced);
        assert_eq!(reply.response, HEDGE);
        assert_eq!(f.gateway.request_count(), 1);
    }

    #[tokio::test]
    async fn test_search_failure_keeps_original() {
        let f = fixture(vec![Script::Reply(HEDGE)], ScriptedSearch::failing());
        let reply = f.use_case.execute(ChatRequest::new("llama3", "Who won?")).await.unwrap();
        assert!(!reply.enhanced);
        assert_eq!(reply.response, HEDGE);
    }

    #[tokio::test]
    async fn test_failed_requery_keeps_original() {
        let f = fixture(
            vec![
                Script::Reply(HEDGE),
                Script::Fail(InferenceFailure::InferenceError("oom".to_string())),
            ],
            ScriptedSearch::with_hits(hits()),
        );
        let reply = f.use_case.execute(ChatRequest::new("llama3", "Who won?")).await.unwrap();
        assert!(!reply.enhanced);
        assert_eq!(reply.response, HEDGE);
        assert_eq!(f.gateway.request_count(), 2);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_uncertainty_check() {
        let f = fixture(vec![], ScriptedSearch::with_hits(hits()));
        let request = ChatRequest::new("llama3", "Who won?");
        f.cache.put(&request.model, &[Message::user("Who won?")], HEDGE);

        let reply = f.use_case.execute(request).await.unwrap();
        assert!(reply.cached);
        assert!(!reply.enhanced);
        assert!(f.search.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_document_grounding_builds_system_message() {
        let f = fixture(vec![Script::Reply("Summary.")], NoSearch);
        let request = ChatRequest::new("llama3", "Summarize").with_document("Chapter one text");
        f.use_case.execute(request).await.unwrap();

        let messages = f.gateway.last_request().messages;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.starts_with("Context from document:\nChapter one text"));
    }

    #[tokio::test]
    async fn test_grounded_augmentation_ends_with_user_turn() {
        let f = fixture(
            vec![Script::Reply(HEDGE), Script::Reply("Sweden won.")],
            ScriptedSearch::with_hits(hits()),
        );
        let request = ChatRequest::new("llama3", "Who won?").with_document("Match report");
        let reply = f.use_case.execute(request).await.unwrap();
        assert!(reply.enhanced);

        let messages = f.gateway.last_request().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.starts_with("Context from document:\nMatch report"));
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.starts_with("Who won?\n\nContext from web search:"));
    }

    #[tokio::test]
    async fn test_follow_up_carries_earlier_turns() {
        let f = fixture(
            vec![Script::Reply("Nice to meet you, Ana."), Script::Reply("Your name is Ana.")],
            NoSearch,
        );
        let first = ChatRequest::new("llama3", "My name is Ana.").with_system("Answer briefly.");
        let reply = f.use_case.execute(first.clone()).await.unwrap();

        let history = vec![Message::user(&first.message), Message::assistant(&reply.response)];
        let second = ChatRequest::new("llama3", "What is my name?")
            .with_system("Answer briefly.")
            .with_history(history);
        let reply = f.use_case.execute(second).await.unwrap();
        assert_eq!(reply.response, "Your name is Ana.");

        let messages = f.gateway.last_request().messages;
        assert_eq!(
            messages,
            vec![
                Message::system("Answer briefly."),
                Message::user("My name is Ana."),
                Message::assistant("Nice to meet you, Ana."),
                Message::user("What is my name?"),
            ]
        );
    }

    #[tokio::test]
    async fn test_history_is_part_of_cache_key() {
        let f = fixture(vec![Script::Reply("a"), Script::Reply("b")], NoSearch);
        f.use_case.execute(ChatRequest::new("llama3", "And then?")).await.unwrap();

        let request = ChatRequest::new("llama3", "And then?")
            .with_history(vec![Message::user("Tell a story."), Message::assistant("Once...")]);
        let reply = f.use_case.execute(request).await.unwrap();
        assert!(!reply.cached);
        assert_eq!(reply.response, "b");
    }

    #[tokio::test]
    async fn test_unknown_model() {
        let f = fixture(vec![], NoSearch);
        let err = f.use_case.execute(ChatRequest::new("phi3", "hi")).await.unwrap_err();
        assert_eq!(err, ChatError::ModelNotAvailable("phi3".to_string()));
        assert_eq!(f.gateway.request_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_message() {
        let f = fixture(vec![], NoSearch);
        let err = f.use_case.execute(ChatRequest::new("llama3", "  ")).await.unwrap_err();
        assert_eq!(err, ChatError::EmptyMessage);
    }

    #[tokio::test]
    async fn test_failure_is_surfaced_and_not_cached() {
        let f = fixture(
            vec![Script::Fail(InferenceFailure::BackendUnavailable("refused".to_string()))],
            NoSearch,
        );
        let err = f.use_case.execute(ChatRequest::new("llama3", "hi")).await.unwrap_err();
        assert_eq!(err, ChatError::BackendUnavailable("refused".to_string()));
        assert!(f.cache.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_stream_is_not_cached() {
        let f = fixture(vec![Script::Hang], NoSearch);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = f
            .use_case
            .execute_with_progress(ChatRequest::new("llama3", "hi"), &NoProgress, &cancel)
            .await
            .unwrap_err();

        assert_eq!(err, ChatError::Cancelled);
        assert!(f.cache.is_empty());
        assert!(f.gateway.producer_tokens.lock().unwrap()[0].is_cancelled());
    }
}
