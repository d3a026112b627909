//! Interactive chat module
//!
//! Provides a readline-based interactive chat with a single model.

mod repl;

pub use repl::ChatRepl;
