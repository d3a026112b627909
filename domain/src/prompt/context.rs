//! Persona context: the system instruction for a participant's turn.

use crate::core::model::ModelId;
use crate::dialogue::dialogue_type::DialogueType;
use crate::dialogue::participant::SlotId;
use crate::prompt::persona::PersonaCatalog;
use std::fmt::Write;

/// Instruction used when a participant has no persona
pub const NO_PERSONA_INSTRUCTION: &str = "You are having a conversation. Respond naturally.";

const PARTNERS_CLAUSE: &str = "Your conversational partners have different personalities. Stay in character.";

/// One row of the participant list shown to every speaker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSummary {
    pub slot: SlotId,
    /// Model id, or the human's display name
    pub label: String,
    pub persona: Option<String>,
    pub human: bool,
}

impl ParticipantSummary {
    pub fn model(slot: SlotId, model: &ModelId, persona: Option<&str>) -> Self {
        Self {
            slot,
            label: model.to_string(),
            persona: persona.map(str::to_string),
            human: false,
        }
    }

    pub fn human(slot: SlotId, name: &str) -> Self {
        Self {
            slot,
            label: name.to_string(),
            persona: None,
            human: true,
        }
    }
}

/// Live dialogue metadata for one upcoming turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueContext {
    pub speaker: SlotId,
    pub current_round: u32,
    pub total_rounds: u32,
    pub participants: Vec<ParticipantSummary>,
    pub last_moderator_text: Option<String>,
}

/// Composes the system instruction from persona, framing, and live context.
///
/// Output is a pure function of the inputs; it becomes part of the prompt,
/// so identical inputs must produce identical bytes.
#[derive(Debug, Clone, Default)]
pub struct PersonaContextBuilder {
    catalog: PersonaCatalog,
}

impl PersonaContextBuilder {
    pub fn new(catalog: PersonaCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PersonaCatalog {
        &self.catalog
    }

    /// Base instruction for `persona` alone.
    pub fn persona_instruction(&self, persona: Option<&str>) -> String {
        match persona.map(str::trim).filter(|p| !p.is_empty()) {
            None => NO_PERSONA_INSTRUCTION.to_string(),
            Some(id) => match self.catalog.instruction(id) {
                Some(base) => format!("{}\n\n{}", base, PARTNERS_CLAUSE),
                None => format!("You are having a conversation as {}. Stay in character.", id),
            },
        }
    }

    pub fn build(
        &self,
        persona: Option<&str>,
        dialogue_type: DialogueType,
        context: &DialogueContext,
    ) -> String {
        let mut out = self.persona_instruction(persona);
        out.push_str("\n\n");
        out.push_str(dialogue_type.framing_clause());
        out.push_str("\n\n");
        out.push_str(&context_block(context));
        out
    }
}

fn context_block(context: &DialogueContext) -> String {
    let mut block = String::from("[Dialogue context]\n");
    let _ = writeln!(
        block,
        "Round {} of {}",
        context.current_round, context.total_rounds
    );
    block.push_str("Participants:\n");
    for p in &context.participants {
        let role = if p.human {
            "human".to_string()
        } else {
            p.persona.clone().unwrap_or_else(|| "no persona".to_string())
        };
        let _ = writeln!(block, "- Slot {}: {} ({})", p.slot, p.label, role);
    }
    let _ = write!(block, "You are: Slot {}", context.speaker);
    if let Some(text) = &context.last_moderator_text {
        let _ = write!(block, "\nLatest moderator note: {}", text);
    }
    block
}
