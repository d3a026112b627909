//! Domain layer for parley
//!
//! This crate contains the core dialogue logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Dialogue
//!
//! A [`DialogueSession`] is an orchestrated conversation between two
//! models, or four models and one human. Turns are strictly round-robin
//! and the transcript is append-only.
//!
//! ## Prompt building
//!
//! Each turn's prompt is a persona system instruction
//! ([`PersonaContextBuilder`]) followed by the last few transcript entries
//! remapped to chat roles from the speaker's point of view
//! ([`HistoryWindow`]).
//!
//! ## Chat
//!
//! Single-model chat answers are fingerprinted for caching
//! ([`Fingerprint`]) and screened for hedging ([`UncertaintyDetector`]).

pub mod chat;
pub mod config;
pub mod core;
pub mod dialogue;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use chat::{DocumentSource, SearchHit, UncertaintyDetector, usable_hits};
pub use config::{ConfigIssue, ConfigIssueCode, ExportFormat, Severity};
pub use core::{
    error::DomainError,
    model::{BackendId, ModelId},
};
pub use dialogue::{
    dialogue_type::DialogueType,
    entities::{DialogueSession, SessionId, SessionSnapshot, SessionSummary, TurnRecord, TurnState},
    history::HistoryWindow,
    participant::{DialogueMode, ModelSeat, Participant, ParticipantTable, Seat, SlotId, Speaker},
};
pub use prompt::{
    ChatGrounding, DialogueContext, ParticipantSummary, PersonaCatalog, PersonaContextBuilder,
    PersonaSummary, PromptTemplate,
};
pub use session::{
    entities::{Message, Role},
    fingerprint::Fingerprint,
    stream::{InferenceFailure, StreamEvent},
};
