//! Moderated dialogue module
//!
//! A readline console for stepping through a dialogue session, taking the
//! human seat's turns and injecting moderator notes.

mod repl;

pub use repl::{DebateRepl, DialogueCommand};
