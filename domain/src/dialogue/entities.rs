//! Dialogue session entities and the turn state machine.
//!
//! ```text
//! NotStarted --begin--> AwaitingTurn(1)
//! AwaitingTurn(s)       --record_model_turn--> AwaitingTurn(next) | AwaitingHumanInput(next) | Completed
//! AwaitingHumanInput(s) --submit_human_turn--> AwaitingTurn(next) | Completed
//! any but Completed     --inject_moderator_message--> (unchanged)
//! ```
//!
//! The transcript is append-only. Every method that returns an error
//! leaves the session exactly as it was.

use crate::core::error::DomainError;
use crate::core::model::ModelId;
use crate::core::string::truncate_chars;
use crate::dialogue::dialogue_type::DialogueType;
use crate::dialogue::participant::{
    ModelSeat, Participant, ParticipantTable, Seat, SlotId, Speaker,
};
use crate::prompt::context::{DialogueContext, ParticipantSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum topic length (characters) derived from an opening prompt
const TOPIC_MAX_CHARS: usize = 100;

/// Opaque, never-reused session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// One utterance in a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub speaker: Speaker,
    /// Final text, never partial
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl TurnRecord {
    pub fn is_moderator(&self) -> bool {
        self.speaker == Speaker::Moderator
    }
}

/// Turn state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "slot", rename_all = "snake_case")]
pub enum TurnState {
    NotStarted,
    AwaitingTurn(SlotId),
    AwaitingHumanInput(SlotId),
    Completed,
}

impl TurnState {
    /// The slot expected to speak next, if any
    pub fn slot(&self) -> Option<SlotId> {
        match self {
            TurnState::AwaitingTurn(s) | TurnState::AwaitingHumanInput(s) => Some(*s),
            TurnState::NotStarted | TurnState::Completed => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TurnState::NotStarted => "not started",
            TurnState::AwaitingTurn(_) => "awaiting a model turn",
            TurnState::AwaitingHumanInput(_) => "awaiting human input",
            TurnState::Completed => "completed",
        }
    }
}

/// Read-only projection of a session for UI/API consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub topic: String,
    pub dialogue_type: DialogueType,
    pub participants: Vec<Participant>,
    pub transcript: Vec<TurnRecord>,
    pub state: TurnState,
    pub current_turn: Option<SlotId>,
    pub rounds_completed: u32,
    pub max_rounds: u32,
    pub completed: bool,
}

/// Listing entry for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub topic: String,
    pub turn_count: usize,
    pub rounds_completed: u32,
    pub max_rounds: u32,
    pub created_at: DateTime<Utc>,
}

/// One orchestrated conversation (Entity)
#[derive(Debug, Clone)]
pub struct DialogueSession {
    id: SessionId,
    owner: Option<String>,
    topic: String,
    dialogue_type: DialogueType,
    participants: ParticipantTable,
    transcript: Vec<TurnRecord>,
    state: TurnState,
    rounds_completed: u32,
    max_rounds: u32,
    created_at: DateTime<Utc>,
}

impl DialogueSession {
    /// Create a session in [`TurnState::NotStarted`].
    pub fn new(
        participants: ParticipantTable,
        max_rounds: u32,
        dialogue_type: DialogueType,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if max_rounds == 0 {
            return Err(DomainError::invalid_config("max_rounds must be at least 1"));
        }
        Ok(Self {
            id: SessionId::generate(),
            owner: None,
            topic: String::new(),
            dialogue_type,
            participants,
            transcript: Vec::new(),
            state: TurnState::NotStarted,
            rounds_completed: 0,
            max_rounds,
            created_at: now,
        })
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    // ==================== Accessors ====================

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn dialogue_type(&self) -> DialogueType {
        self.dialogue_type
    }

    pub fn participants(&self) -> &ParticipantTable {
        &self.participants
    }

    pub fn transcript(&self) -> &[TurnRecord] {
        &self.transcript
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn current_turn(&self) -> Option<SlotId> {
        self.state.slot()
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn is_completed(&self) -> bool {
        self.state == TurnState::Completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the most recent transcript entry (or creation)
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.transcript
            .last()
            .map(|t| t.timestamp)
            .unwrap_or(self.created_at)
    }

    // ==================== Transitions ====================

    /// Seed the transcript with the opening prompt and hand the turn to slot 1.
    ///
    /// `topic` defaults to the first 100 characters of `opening`.
    pub fn begin(
        &mut self,
        opening: &str,
        topic: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TurnRecord, DomainError> {
        self.require_not_started("begin")?;
        if opening.trim().is_empty() {
            return Err(DomainError::invalid_config("the opening prompt is empty"));
        }

        self.topic = match topic.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => t.to_string(),
            None => truncate_chars(opening.trim(), TOPIC_MAX_CHARS).to_string(),
        };
        let record = self.append(Speaker::Moderator, opening.to_string(), None, now);
        self.state = self.state_for(SlotId::FIRST);
        Ok(record)
    }

    /// The model seat that must speak next.
    ///
    /// Fails with [`DomainError::HumanTurnPending`] when the human slot is up.
    pub fn expect_model_turn(&self) -> Result<(SlotId, &ModelSeat), DomainError> {
        match self.state {
            TurnState::AwaitingTurn(slot) => self
                .participants
                .get(slot)
                .and_then(|p| p.seat.as_model())
                .map(|seat| (slot, seat))
                .ok_or(DomainError::HumanTurnPending(slot)),
            TurnState::AwaitingHumanInput(slot) => Err(DomainError::HumanTurnPending(slot)),
            state => Err(DomainError::InvalidTransition {
                action: "take a model turn",
                state: state.as_str().to_string(),
            }),
        }
    }

    /// Append the current model's completed response and advance the turn.
    pub fn record_model_turn(
        &mut self,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<TurnRecord, DomainError> {
        let (slot, seat) = self.expect_model_turn()?;
        let seat = seat.clone();
        let record = self.append(Speaker::Participant(slot), content.into(), Some(seat), now);
        self.finish_turn(slot);
        Ok(record)
    }

    /// Append the human participant's turn and advance past their slot.
    pub fn submit_human_turn(
        &mut self,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<TurnRecord, DomainError> {
        let slot = match self.state {
            TurnState::AwaitingHumanInput(slot) => slot,
            TurnState::Completed | TurnState::NotStarted => {
                return Err(DomainError::InvalidTransition {
                    action: "submit a human turn",
                    state: self.state.as_str().to_string(),
                });
            }
            TurnState::AwaitingTurn(_) => return Err(DomainError::NotHumanTurn),
        };
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::invalid_config("the human turn is empty"));
        }
        let record = self.append(Speaker::Participant(slot), content, None, now);
        self.finish_turn(slot);
        Ok(record)
    }

    /// Append a moderator message. Never moves the turn pointer or the
    /// round counter.
    pub fn inject_moderator_message(
        &mut self,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<TurnRecord, DomainError> {
        if self.is_completed() {
            return Err(DomainError::InvalidTransition {
                action: "inject a moderator message",
                state: self.state.as_str().to_string(),
            });
        }
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::invalid_config("the moderator message is empty"));
        }
        Ok(self.append(Speaker::Moderator, text, None, now))
    }

    // ==================== Projections ====================

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            topic: self.topic.clone(),
            dialogue_type: self.dialogue_type,
            participants: self.participants.iter().cloned().collect(),
            transcript: self.transcript.clone(),
            state: self.state,
            current_turn: self.current_turn(),
            rounds_completed: self.rounds_completed,
            max_rounds: self.max_rounds,
            completed: self.is_completed(),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            topic: self.topic.clone(),
            turn_count: self.transcript.len(),
            rounds_completed: self.rounds_completed,
            max_rounds: self.max_rounds,
            created_at: self.created_at,
        }
    }

    /// Live metadata for the persona context of `speaker`'s next turn
    pub fn dialogue_context(&self, speaker: SlotId) -> DialogueContext {
        DialogueContext {
            speaker,
            current_round: self.rounds_completed + 1,
            total_rounds: self.max_rounds,
            participants: self
                .participants
                .iter()
                .map(|p| match &p.seat {
                    Seat::Model(m) => ParticipantSummary::model(p.slot, &m.model, m.persona.as_deref()),
                    Seat::Human { name } => ParticipantSummary::human(p.slot, name),
                })
                .collect(),
            last_moderator_text: self
                .transcript
                .iter()
                .rev()
                .find(|t| t.is_moderator())
                .map(|t| t.content.clone()),
        }
    }

    // ==================== Internals ====================

    fn require_not_started(&self, action: &'static str) -> Result<(), DomainError> {
        if self.state == TurnState::NotStarted {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                action,
                state: self.state.as_str().to_string(),
            })
        }
    }

    fn state_for(&self, slot: SlotId) -> TurnState {
        if self.participants.is_human(slot) {
            TurnState::AwaitingHumanInput(slot)
        } else {
            TurnState::AwaitingTurn(slot)
        }
    }

    fn finish_turn(&mut self, slot: SlotId) {
        self.rounds_completed += 1;
        self.state = if self.rounds_completed >= self.max_rounds {
            TurnState::Completed
        } else {
            self.state_for(slot.next(self.participants.len()))
        };
    }

    /// Timestamps never go backwards within a session.
    fn append(
        &mut self,
        speaker: Speaker,
        content: String,
        seat: Option<ModelSeat>,
        now: DateTime<Utc>,
    ) -> TurnRecord {
        let timestamp = self.transcript.last().map_or(now, |t| t.timestamp.max(now));
        let (model, persona) = match seat {
            Some(seat) => (Some(seat.model), seat.persona),
            None => (None, None),
        };
        let record = TurnRecord {
            speaker,
            content,
            model,
            persona,
            timestamp,
        };
        self.transcript.push(record.clone());
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::participant::DialogueMode;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn slot(n: u8) -> SlotId {
        SlotId::new(n).unwrap()
    }

    fn two_party(max_rounds: u32) -> DialogueSession {
        let table = ParticipantTable::new(
            DialogueMode::TwoParty,
            vec![
                ModelSeat::new("llama3").with_persona("INTJ - Architect").into(),
                ModelSeat::new("mistral").into(),
            ],
        )
        .unwrap();
        let mut session = DialogueSession::new(table, max_rounds, DialogueType::Debate, t0()).unwrap();
        session.begin("Is X better than Y?", Some("X"), t0()).unwrap();
        session
    }

    fn multi_party(max_rounds: u32) -> DialogueSession {
        let table = ParticipantTable::new(
            DialogueMode::MultiParty,
            vec![
                ModelSeat::new("m1").into(),
                ModelSeat::new("m2").into(),
                ModelSeat::new("m3").into(),
                ModelSeat::new("m4").into(),
                Seat::human("you"),
            ],
        )
        .unwrap();
        let mut session = DialogueSession::new(table, max_rounds, DialogueType::Discussion, t0()).unwrap();
        session.begin("Remote work", None, t0()).unwrap();
        session
    }

    #[test]
    fn test_begin_seeds_moderator_turn() {
        let session = two_party(5);
        assert_eq!(session.transcript().len(), 1);
        assert!(session.transcript()[0].is_moderator());
        assert_eq!(session.topic(), "X");
        assert_eq!(session.state(), TurnState::AwaitingTurn(slot(1)));
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let table = two_party(1).participants().clone();
        assert!(DialogueSession::new(table, 0, DialogueType::Debate, t0()).is_err());
    }

    #[test]
    fn test_topic_defaults_to_truncated_opening() {
        let table = two_party(1).participants().clone();
        let mut session = DialogueSession::new(table, 1, DialogueType::Debate, t0()).unwrap();
        let long = "a".repeat(250);
        session.begin(&long, None, t0()).unwrap();
        assert_eq!(session.topic().len(), 100);
    }

    #[test]
    fn test_topic_truncation_counts_characters() {
        let table = two_party(1).participants().clone();
        let mut session = DialogueSession::new(table, 1, DialogueType::Debate, t0()).unwrap();
        let opening = "Da li je šećer štetan? ".repeat(10);
        session.begin(&opening, None, t0()).unwrap();

        assert_eq!(session.topic().chars().count(), 100);
        assert!(opening.starts_with(session.topic()));
        assert!(session.topic().len() > 100);
    }

    #[test]
    fn test_two_party_alternates_and_completes() {
        let mut session = two_party(5);
        let mut speakers = Vec::new();
        while !session.is_completed() {
            let (s, _) = session.expect_model_turn().unwrap();
            speakers.push(s.get());
            session.record_model_turn(format!("turn {}", s), t0()).unwrap();
        }
        assert_eq!(speakers, vec![1, 2, 1, 2, 1]);
        assert_eq!(session.rounds_completed(), 5);
        assert_eq!(session.transcript().len(), 6);
        assert_eq!(session.current_turn(), None);
    }

    #[test]
    fn test_example_scenario_turn_pointer() {
        let mut session = two_party(5);
        session.record_model_turn("first", t0()).unwrap();
        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.current_turn(), Some(slot(2)));
        session.record_model_turn("second", t0()).unwrap();
        assert_eq!(session.transcript().len(), 3);
        assert_eq!(session.current_turn(), Some(slot(1)));
    }

    #[test]
    fn test_model_turn_records_model_and_persona() {
        let mut session = two_party(2);
        let record = session.record_model_turn("hello", t0()).unwrap();
        assert_eq!(record.speaker, Speaker::Participant(slot(1)));
        assert_eq!(record.model, Some(ModelId::new("llama3")));
        assert_eq!(record.persona.as_deref(), Some("INTJ - Architect"));
    }

    #[test]
    fn test_record_after_completion_fails_without_mutation() {
        let mut session = two_party(1);
        session.record_model_turn("only", t0()).unwrap();
        assert!(session.is_completed());
        let before = session.transcript().len();
        assert!(session.record_model_turn("extra", t0()).is_err());
        assert_eq!(session.transcript().len(), before);
    }

    #[test]
    fn test_moderator_injection_keeps_turn_and_rounds() {
        let mut session = two_party(5);
        session.record_model_turn("first", t0()).unwrap();
        let turn = session.current_turn();
        let rounds = session.rounds_completed();

        session.inject_moderator_message("Stay on topic", t0()).unwrap();

        assert_eq!(session.current_turn(), turn);
        assert_eq!(session.rounds_completed(), rounds);
        assert_eq!(session.transcript().last().unwrap().content, "Stay on topic");
    }

    #[test]
    fn test_moderator_injection_rejected_when_completed() {
        let mut session = two_party(1);
        session.record_model_turn("done", t0()).unwrap();
        assert!(matches!(
            session.inject_moderator_message("late", t0()),
            Err(DomainError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_multi_party_pauses_for_human() {
        let mut session = multi_party(7);
        for _ in 0..4 {
            session.record_model_turn("model says", t0()).unwrap();
        }
        assert_eq!(session.state(), TurnState::AwaitingHumanInput(slot(5)));
        assert_eq!(session.expect_model_turn().unwrap_err(), DomainError::HumanTurnPending(slot(5)));

        // A moderator note does not unblock the human slot.
        session.inject_moderator_message("note", t0()).unwrap();
        assert_eq!(session.state(), TurnState::AwaitingHumanInput(slot(5)));

        session.submit_human_turn("my view", t0()).unwrap();
        assert_eq!(session.state(), TurnState::AwaitingTurn(slot(1)));
        assert_eq!(session.rounds_completed(), 5);
    }

    #[test]
    fn test_submit_human_turn_out_of_turn() {
        let mut session = multi_party(7);
        assert_eq!(
            session.submit_human_turn("too early", t0()).unwrap_err(),
            DomainError::NotHumanTurn
        );
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let mut session = two_party(3);
        let earlier = t0() - Duration::seconds(30);
        let record = session.record_model_turn("clock skew", earlier).unwrap();
        assert_eq!(record.timestamp, t0());
        let later = t0() + Duration::seconds(5);
        let record = session.record_model_turn("later", later).unwrap();
        assert_eq!(record.timestamp, later);
    }

    #[test]
    fn test_dialogue_context_reflects_state() {
        let mut session = two_party(4);
        session.record_model_turn("first", t0()).unwrap();
        session.inject_moderator_message("Focus on cost", t0()).unwrap();

        let ctx = session.dialogue_context(slot(2));
        assert_eq!(ctx.current_round, 2);
        assert_eq!(ctx.total_rounds, 4);
        assert_eq!(ctx.participants.len(), 2);
        assert_eq!(ctx.last_moderator_text.as_deref(), Some("Focus on cost"));
    }

    #[test]
    fn test_snapshot_projection() {
        let mut session = two_party(2);
        session.record_model_turn("a", t0()).unwrap();
        let snap = session.snapshot();
        assert_eq!(snap.transcript.len(), 2);
        assert_eq!(snap.current_turn, Some(slot(2)));
        assert!(!snap.completed);
        assert_eq!(snap.rounds_completed, 1);
    }

    #[test]
    fn test_session_id_roundtrip() {
        let id = SessionId::generate();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
