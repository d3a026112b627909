//! Participant slots and the participant table.

use crate::core::error::DomainError;
use crate::core::model::{BackendId, ModelId};
use serde::{Deserialize, Serialize};

/// A 1-based participant slot number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlotId(u8);

impl SlotId {
    pub const FIRST: SlotId = SlotId(1);

    /// Returns `None` for slot 0.
    pub fn new(n: u8) -> Option<Self> {
        (n > 0).then_some(Self(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Round-robin successor: `(current mod total) + 1`.
    pub fn next(self, total: usize) -> SlotId {
        let total = total.clamp(1, u8::MAX as usize) as u8;
        SlotId((self.0 % total) + 1)
    }

    fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for SlotId {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        SlotId::new(n).ok_or_else(|| "slot numbers start at 1".to_string())
    }
}

impl From<SlotId> for u8 {
    fn from(slot: SlotId) -> u8 {
        slot.0
    }
}

/// Who authored a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Participant(SlotId),
    Moderator,
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::Participant(slot) => write!(f, "participant{}", slot),
            Speaker::Moderator => write!(f, "moderator"),
        }
    }
}

/// A model seat: which model, wearing which persona, on which backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSeat {
    pub model: ModelId,
    pub persona: Option<String>,
    #[serde(default)]
    pub source: BackendId,
}

impl ModelSeat {
    pub fn new(model: impl Into<ModelId>) -> Self {
        Self {
            model: model.into(),
            persona: None,
            source: BackendId::default(),
        }
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    pub fn with_source(mut self, source: BackendId) -> Self {
        self.source = source;
        self
    }
}

/// What occupies a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Seat {
    Model(ModelSeat),
    Human { name: String },
}

impl Seat {
    pub fn human(name: impl Into<String>) -> Self {
        Seat::Human { name: name.into() }
    }

    pub fn as_model(&self) -> Option<&ModelSeat> {
        match self {
            Seat::Model(seat) => Some(seat),
            Seat::Human { .. } => None,
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, Seat::Human { .. })
    }
}

impl From<ModelSeat> for Seat {
    fn from(seat: ModelSeat) -> Self {
        Seat::Model(seat)
    }
}

/// A slot together with its occupant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub slot: SlotId,
    pub seat: Seat,
}

/// Shape of an orchestrated dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueMode {
    /// Two models taking turns.
    TwoParty,
    /// Four models and one human, five slots in fixed order.
    MultiParty,
}

impl DialogueMode {
    pub const MULTI_PARTY_SLOTS: usize = 5;
}

/// Ordered participant table; slot numbers follow insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantTable {
    mode: DialogueMode,
    entries: Vec<Participant>,
}

impl ParticipantTable {
    /// Validate `seats` against `mode` and assign slots 1..=N.
    pub fn new(mode: DialogueMode, seats: Vec<Seat>) -> Result<Self, DomainError> {
        if seats.is_empty() {
            return Err(DomainError::invalid_config("no participants given"));
        }
        if let Some(empty) = seats
            .iter()
            .filter_map(Seat::as_model)
            .find(|s| s.model.as_str().trim().is_empty())
        {
            return Err(DomainError::invalid_config(format!(
                "empty model name (persona {:?})",
                empty.persona
            )));
        }

        let models = seats.iter().filter(|s| !s.is_human()).count();
        let humans = seats.len() - models;

        match mode {
            DialogueMode::TwoParty => {
                if humans > 0 {
                    return Err(DomainError::invalid_config(
                        "a two-party dialogue has no human slot",
                    ));
                }
                if models != 2 {
                    return Err(DomainError::invalid_config(format!(
                        "a two-party dialogue needs exactly 2 model participants, got {}",
                        models
                    )));
                }
            }
            DialogueMode::MultiParty => {
                if seats.len() != DialogueMode::MULTI_PARTY_SLOTS {
                    return Err(DomainError::invalid_config(format!(
                        "a multi-party dialogue needs {} slots, got {}",
                        DialogueMode::MULTI_PARTY_SLOTS,
                        seats.len()
                    )));
                }
                if humans != 1 {
                    return Err(DomainError::invalid_config(format!(
                        "a multi-party dialogue needs exactly 1 human slot, got {}",
                        humans
                    )));
                }
            }
        }

        let entries = seats
            .into_iter()
            .enumerate()
            .map(|(i, seat)| Participant {
                slot: SlotId(i as u8 + 1),
                seat,
            })
            .collect();

        Ok(Self { mode, entries })
    }

    pub fn mode(&self) -> DialogueMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, slot: SlotId) -> Option<&Participant> {
        self.entries.get(slot.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.entries.iter()
    }

    /// Model seats with their slots, in slot order
    pub fn models(&self) -> impl Iterator<Item = (SlotId, &ModelSeat)> {
        self.entries
            .iter()
            .filter_map(|p| p.seat.as_model().map(|m| (p.slot, m)))
    }

    pub fn is_human(&self, slot: SlotId) -> bool {
        self.get(slot).is_some_and(|p| p.seat.is_human())
    }
}
