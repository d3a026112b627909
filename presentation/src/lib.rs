//! Presentation layer for parley
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the interactive chat and dialogue consoles.

pub mod chat;
pub mod cli;
pub mod config;
pub mod dialogue;
pub mod interrupt;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{ChatArgs, Cli, Command, DebateArgs, parse_seat};
pub use config::ReplConfig;
pub use dialogue::{DebateRepl, DialogueCommand};
pub use interrupt::InterruptScope;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::ProgressReporter;
