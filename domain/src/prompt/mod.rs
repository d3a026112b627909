//! Prompt domain
//!
//! Persona instructions, per-turn dialogue context, and chat templates.

pub mod context;
pub mod persona;
mod template;

pub use context::{DialogueContext, ParticipantSummary, PersonaContextBuilder};
pub use persona::{PersonaCatalog, PersonaSummary};
pub use template::{ChatGrounding, PromptTemplate};
