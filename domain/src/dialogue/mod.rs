//! Dialogue sessions: participants, turn scheduling and history.

pub mod dialogue_type;
pub mod entities;
pub mod history;
pub mod participant;
