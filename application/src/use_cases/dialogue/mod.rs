//! Dialogue use case
//!
//! Drives two-party and multi-party dialogue sessions one explicit step at
//! a time. Each model turn builds a persona system prompt plus a history
//! window, streams the answer, and appends it. This path never consults
//! the response cache.

mod error;
mod registry;

pub use error::DialogueError;
pub use registry::{SessionEntry, SessionRegistry};

use crate::config::{GenerationParams, SessionParams};
use crate::ports::clock::Clock;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::inference_gateway::{GenerateRequest, InferenceGateway};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::transcript_exporter::TranscriptExporter;
use crate::use_cases::model_catalog::ModelCatalog;
use crate::use_cases::stream_delivery::StreamDelivery;
use parley_domain::{
    DialogueMode, DialogueSession, DialogueType, HistoryWindow, Message, ModelSeat,
    ParticipantTable, PersonaCatalog, PersonaContextBuilder, Seat, SessionId, SessionSnapshot,
    SessionSummary, SlotId, TurnRecord, TurnState,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Input for starting a dialogue
#[derive(Debug, Clone)]
pub struct StartDialogue {
    pub owner: Option<String>,
    pub mode: DialogueMode,
    pub seats: Vec<Seat>,
    /// Seeds the transcript as the first moderator turn
    pub opening: String,
    /// Defaults to the start of `opening`
    pub topic: Option<String>,
    /// Defaults to the configured round limit
    pub max_rounds: Option<u32>,
    pub dialogue_type: DialogueType,
}

impl StartDialogue {
    /// Two models debating `opening`.
    pub fn two_party(first: ModelSeat, second: ModelSeat, opening: impl Into<String>) -> Self {
        Self {
            owner: None,
            mode: DialogueMode::TwoParty,
            seats: vec![first.into(), second.into()],
            opening: opening.into(),
            topic: None,
            max_rounds: None,
            dialogue_type: DialogueType::default(),
        }
    }

    /// Four models and one human on `opening`.
    pub fn multi_party(seats: Vec<Seat>, opening: impl Into<String>) -> Self {
        Self {
            owner: None,
            mode: DialogueMode::MultiParty,
            seats,
            opening: opening.into(),
            topic: None,
            max_rounds: None,
            dialogue_type: DialogueType::default(),
        }
    }

    /// Two model seats make a two-party dialogue; any other seat list is
    /// validated as multi-party.
    pub fn from_seats(seats: Vec<Seat>, opening: impl Into<String>) -> Self {
        let two_models = seats.len() == 2 && !seats.iter().any(Seat::is_human);
        let mut input = Self::multi_party(seats, opening);
        if two_models {
            input.mode = DialogueMode::TwoParty;
        }
        input
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    pub fn with_dialogue_type(mut self, dialogue_type: DialogueType) -> Self {
        self.dialogue_type = dialogue_type;
        self
    }
}

/// Result of one `advance` call
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// A model spoke; `state` is where the session is now.
    Turn { record: TurnRecord, state: TurnState },
    /// The session was already complete; nothing happened.
    Completed(SessionSnapshot),
}

impl AdvanceOutcome {
    pub fn is_completed(&self) -> bool {
        match self {
            AdvanceOutcome::Turn { state, .. } => *state == TurnState::Completed,
            AdvanceOutcome::Completed(_) => true,
        }
    }
}

/// Prompt for one model turn, captured under the session lock
struct PreparedTurn {
    slot: SlotId,
    seat: ModelSeat,
    messages: Vec<Message>,
}

/// Use case for orchestrated dialogues
pub struct DialogueUseCase<G: InferenceGateway + 'static> {
    gateway: Arc<G>,
    catalog: Arc<ModelCatalog<G>>,
    registry: SessionRegistry,
    context_builder: PersonaContextBuilder,
    history: HistoryWindow,
    params: SessionParams,
    generation: GenerationParams,
    clock: Arc<dyn Clock>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl<G: InferenceGateway + 'static> DialogueUseCase<G> {
    pub fn new(
        gateway: Arc<G>,
        catalog: Arc<ModelCatalog<G>>,
        clock: Arc<dyn Clock>,
        params: SessionParams,
    ) -> Self {
        Self {
            gateway,
            catalog,
            registry: SessionRegistry::new(&params, clock.clone()),
            context_builder: PersonaContextBuilder::default(),
            history: HistoryWindow::new(params.history_window),
            params,
            generation: GenerationParams::default(),
            clock,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_personas(mut self, personas: PersonaCatalog) -> Self {
        self.context_builder = PersonaContextBuilder::new(personas);
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

    pub fn personas(&self) -> &PersonaCatalog {
        self.context_builder.catalog()
    }

    /// Validate participants, seed the transcript, and register the session.
    pub async fn start(&self, input: StartDialogue) -> Result<SessionSnapshot, DialogueError> {
        let table = ParticipantTable::new(input.mode, input.seats)?;
        for (slot, seat) in table.models() {
            let available = self
                .catalog
                .is_available(&seat.source, &seat.model)
                .await
                .map_err(|e| DialogueError::from_gateway(e, slot, &seat.model))?;
            if !available {
                return Err(DialogueError::ParticipantUnavailable {
                    slot,
                    model: seat.model.clone(),
                });
            }
        }

        let now = self.clock.now();
        let max_rounds = input.max_rounds.unwrap_or(self.params.default_max_rounds);
        let mut session = DialogueSession::new(table, max_rounds, input.dialogue_type, now)?;
        if let Some(owner) = input.owner {
            session = session.with_owner(owner);
        }
        session.begin(&input.opening, input.topic.as_deref(), now)?;

        let snapshot = session.snapshot();
        self.registry.insert(session).await?;

        info!(
            "Started {} session {} with {} participants",
            snapshot.dialogue_type,
            snapshot.session_id,
            snapshot.participants.len()
        );
        self.conversation_logger.log(ConversationEvent::new(
            "session_started",
            serde_json::json!({
                "session_id": snapshot.session_id.to_string(),
                "topic": snapshot.topic,
                "dialogue_type": snapshot.dialogue_type.as_str(),
                "max_rounds": snapshot.max_rounds,
                "participants": snapshot.participants,
            }),
        ));
        Ok(snapshot)
    }

    /// Run the next model turn with default (no-op) progress
    pub async fn advance(
        &self,
        id: SessionId,
        owner: Option<&str>,
    ) -> Result<AdvanceOutcome, DialogueError> {
        self.advance_with_progress(id, owner, &NoProgress, &CancellationToken::new())
            .await
    }

    /// Run the next model turn.
    ///
    /// On any error the session is left untouched, so the same call can be
    /// retried. A second call while one is in flight fails with
    /// [`DialogueError::TurnInProgress`].
    pub async fn advance_with_progress(
        &self,
        id: SessionId,
        owner: Option<&str>,
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<AdvanceOutcome, DialogueError> {
        let entry = self.authorized(id, owner).await?;
        let _gate = entry
            .try_begin_turn()
            .ok_or(DialogueError::TurnInProgress(id))?;

        let turn = match self.prepare_turn(&entry)? {
            Some(turn) => turn,
            None => return Ok(AdvanceOutcome::Completed(entry.lock().snapshot())),
        };
        let PreparedTurn {
            slot,
            seat,
            messages,
        } = turn;

        // Models can be removed between turns, so skip the cached listing
        let available = self
            .catalog
            .is_installed_now(&seat.source, &seat.model)
            .await
            .map_err(|e| DialogueError::from_gateway(e, slot, &seat.model))?;
        if !available {
            warn!("Participant {} ({}) is not available", slot, seat.model);
            return Err(DialogueError::ParticipantUnavailable {
                slot,
                model: seat.model,
            });
        }

        progress.on_turn_start(slot, &seat.model);
        debug!(
            "Session {}: slot {} ({}) speaking with {} prompt messages",
            id,
            slot,
            seat.model,
            messages.len()
        );

        let delivered = async {
            let handle = self
                .gateway
                .generate_stream(GenerateRequest {
                    backend: seat.source.clone(),
                    model: seat.model.clone(),
                    messages,
                    options: self.generation.dialogue_options(),
                })
                .await?;
            StreamDelivery::new(self.generation.request_timeout)
                .drive(handle, &seat.model, progress, cancel)
                .await
        }
        .await;

        let delivered = match delivered {
            Ok(delivered) => delivered,
            Err(e) => {
                warn!("Session {}: turn for slot {} failed: {}", id, slot, e);
                progress.on_turn_complete(slot, &seat.model, false);
                return Err(DialogueError::from_gateway(e, slot, &seat.model));
            }
        };

        let (record, state) = {
            let mut session = entry.lock();
            let record = session.record_model_turn(delivered.text, self.clock.now())?;
            (record, session.state())
        };
        progress.on_turn_complete(slot, &seat.model, true);

        self.conversation_logger.log(ConversationEvent::new(
            "turn_completed",
            serde_json::json!({
                "session_id": id.to_string(),
                "slot": slot.get(),
                "model": seat.model.as_str(),
                "persona": seat.persona,
                "content": record.content,
                "elapsed_ms": delivered.elapsed.as_millis() as u64,
            }),
        ));
        Ok(AdvanceOutcome::Turn { record, state })
    }

    /// Record the human participant's turn and move past their slot.
    pub async fn submit_human_turn(
        &self,
        id: SessionId,
        owner: Option<&str>,
        text: &str,
    ) -> Result<TurnRecord, DialogueError> {
        let entry = self.authorized(id, owner).await?;
        let record = entry.lock().submit_human_turn(text, self.clock.now())?;
        self.conversation_logger.log(ConversationEvent::new(
            "human_turn_submitted",
            serde_json::json!({
                "session_id": id.to_string(),
                "speaker": record.speaker.to_string(),
                "content": record.content,
            }),
        ));
        Ok(record)
    }

    /// Append a moderator note without touching turn order or round count.
    pub async fn inject_moderator_message(
        &self,
        id: SessionId,
        owner: Option<&str>,
        text: &str,
    ) -> Result<TurnRecord, DialogueError> {
        let entry = self.authorized(id, owner).await?;
        let record = entry.lock().inject_moderator_message(text, self.clock.now())?;
        self.conversation_logger.log(ConversationEvent::new(
            "moderator_injected",
            serde_json::json!({
                "session_id": id.to_string(),
                "content": record.content,
            }),
        ));
        Ok(record)
    }

    pub async fn snapshot(
        &self,
        id: SessionId,
        owner: Option<&str>,
    ) -> Result<SessionSnapshot, DialogueError> {
        Ok(self.authorized(id, owner).await?.lock().snapshot())
    }

    /// Sessions visible to `owner` (unowned sessions are visible to all),
    /// oldest first.
    pub async fn list_sessions(&self, owner: Option<&str>) -> Vec<SessionSummary> {
        let mut summaries: Vec<SessionSummary> = self
            .registry
            .entries()
            .await
            .iter()
            .filter_map(|entry| {
                let session = entry.lock();
                visible_to(&session, owner).then(|| session.summary())
            })
            .collect();
        summaries.sort_by_key(|s| s.created_at);
        summaries
    }

    pub async fn delete_session(&self, id: SessionId, owner: Option<&str>) -> Result<(), DialogueError> {
        self.authorized(id, owner).await?;
        self.registry.remove(id).await;
        info!("Deleted session {}", id);
        Ok(())
    }

    /// Write the session's transcript through `exporter`.
    pub async fn export(
        &self,
        id: SessionId,
        owner: Option<&str>,
        exporter: &dyn TranscriptExporter,
    ) -> Result<PathBuf, DialogueError> {
        let snapshot = self.snapshot(id, owner).await?;
        let path = exporter.export(&snapshot)?;
        info!("Exported session {} as {:?} to {}", id, exporter.format(), path.display());
        Ok(path)
    }

    async fn authorized(
        &self,
        id: SessionId,
        owner: Option<&str>,
    ) -> Result<Arc<SessionEntry>, DialogueError> {
        let entry = self.registry.get(id).await?;
        let allowed = visible_to(&entry.lock(), owner);
        if allowed {
            Ok(entry)
        } else {
            Err(DialogueError::Unauthorized(id))
        }
    }

    /// Build the prompt for the expected model turn; `None` when completed.
    fn prepare_turn(&self, entry: &SessionEntry) -> Result<Option<PreparedTurn>, DialogueError> {
        let session = entry.lock();
        if session.is_completed() {
            return Ok(None);
        }
        let (slot, seat) = session.expect_model_turn()?;
        let system = self.context_builder.build(
            seat.persona.as_deref(),
            session.dialogue_type(),
            &session.dialogue_context(slot),
        );

        let mut messages = vec![Message::system(system)];
        messages.extend(self.history.build(session.transcript(), slot));
        Ok(Some(PreparedTurn {
            slot,
            seat: seat.clone(),
            messages,
        }))
    }
}

fn visible_to(session: &DialogueSession, owner: Option<&str>) -> bool {
    match session.owner() {
        None => true,
        Some(session_owner) => owner == Some(session_owner),
    }
}
