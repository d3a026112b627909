//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use parley_domain::{BackendId, DialogueType, ExportFormat, ModelSeat, Seat};
use std::path::PathBuf;

/// CLI arguments for parley
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(author, version, about = "Chat with local models, or let them debate each other")]
#[command(long_about = r#"
Parley talks to local model runtimes (Ollama and compatible servers).

  chat      Ask one model; hedging answers are retried with web search context
  debate    Two models (or four models and you) take turns on a topic
  models    List the models installed on a backend
  personas  List the built-in and configured personas

Configuration files are loaded from (in priority order):
1. PARLEY_* environment variables (PARLEY_CACHE__TTL_SECS=60)
2. --config <path>     Explicit config file
3. ./parley.toml       Project-level config
4. ~/.config/parley/config.toml   Global config

Example:
  parley chat -m llama3 "Explain borrow checking in two sentences"
  parley debate -s llama3=INTJ -s mistral=ENFP "Is remote work better?"
  parley debate -s m1 -s human=Ana -s m2 -s m3 -s m4 --type discussion "City planning"
"#)]
pub struct Cli {
    /// Omitted only together with --show-config
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long, global = true)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chat with a single model
    Chat(ChatArgs),
    /// Run a turn-based dialogue between models
    Debate(DebateArgs),
    /// List models installed on a backend
    Models {
        /// Backend name (defaults to the configured default)
        #[arg(short, long)]
        backend: Option<String>,
    },
    /// List available personas
    Personas,
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Model to chat with
    #[arg(short, long)]
    pub model: String,

    /// Backend serving the model
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Ground answers in this plain-text document
    #[arg(short, long, value_name = "PATH")]
    pub document: Option<PathBuf>,

    /// Always ask the model, never answer from cache
    #[arg(long)]
    pub no_cache: bool,

    /// System instruction sent ahead of the conversation
    #[arg(short, long, value_name = "TEXT")]
    pub system: Option<String>,

    /// One-shot question; starts an interactive session when omitted
    pub message: Option<String>,
}

#[derive(Args, Debug)]
pub struct DebateArgs {
    /// Participant seat, in slot order: MODEL[@BACKEND][=PERSONA], or human[=NAME]
    #[arg(short, long = "seat", value_name = "SEAT", required = true)]
    pub seats: Vec<String>,

    /// Number of rounds (each participant turn counts as one)
    #[arg(short, long)]
    pub rounds: Option<u32>,

    /// How participants are asked to engage
    #[arg(short = 't', long = "type", value_enum)]
    pub dialogue_type: Option<DialogueTypeArg>,

    /// Topic label (defaults to the start of the opening prompt)
    #[arg(long)]
    pub topic: Option<String>,

    /// Run every model turn without prompting, then exit
    #[arg(long)]
    pub auto: bool,

    /// Transcript format for /save
    #[arg(long, value_enum)]
    pub export_format: Option<ExportFormatArg>,

    /// Opening prompt, recorded as the moderator's first turn
    pub opening: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialogueTypeArg {
    Debate,
    Discussion,
    Brainstorm,
}

impl From<DialogueTypeArg> for DialogueType {
    fn from(arg: DialogueTypeArg) -> Self {
        match arg {
            DialogueTypeArg::Debate => DialogueType::Debate,
            DialogueTypeArg::Discussion => DialogueType::Discussion,
            DialogueTypeArg::Brainstorm => DialogueType::Brainstorm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormatArg {
    Text,
    Json,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Text => ExportFormat::Text,
            ExportFormatArg::Json => ExportFormat::Json,
        }
    }
}

/// Parse a `--seat` value.
///
/// `human` or `human=NAME` is the human slot. Anything else is a model:
/// `llama3:8b`, `llama3:8b@kiklop`, `mistral=INTJ - Architect`,
/// `mistral@kiklop=ENFP`.
pub fn parse_seat(raw: &str, default_backend: &BackendId) -> Result<Seat, String> {
    let raw = raw.trim();
    let (head, persona) = match raw.split_once('=') {
        Some((head, persona)) => (head.trim(), Some(persona.trim())),
        None => (raw, None),
    };

    if head.eq_ignore_ascii_case("human") {
        let name = persona.filter(|n| !n.is_empty()).unwrap_or("human");
        return Ok(Seat::human(name));
    }

    let (model, backend) = match head.split_once('@') {
        Some((model, backend)) => (model.trim(), BackendId::new(backend.trim())),
        None => (head, default_backend.clone()),
    };
    if model.is_empty() {
        return Err(format!("seat '{}' names no model", raw));
    }

    let mut seat = ModelSeat::new(model).with_source(backend);
    if let Some(persona) = persona.filter(|p| !p.is_empty()) {
        seat = seat.with_persona(persona);
    }
    Ok(seat.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ollama() -> BackendId {
        BackendId::new("ollama")
    }

    #[test]
    fn test_parse_plain_model() {
        let seat = parse_seat("llama3:8b", &ollama()).unwrap();
        let model = seat.as_model().unwrap();
        assert_eq!(model.model.as_str(), "llama3:8b");
        assert_eq!(model.source, ollama());
        assert!(model.persona.is_none());
    }

    #[test]
    fn test_parse_model_backend_persona() {
        let seat = parse_seat("mistral@kiklop=INTJ - Architect", &ollama()).unwrap();
        let model = seat.as_model().unwrap();
        assert_eq!(model.model.as_str(), "mistral");
        assert_eq!(model.source, BackendId::new("kiklop"));
        assert_eq!(model.persona.as_deref(), Some("INTJ - Architect"));
    }

    #[test]
    fn test_parse_human() {
        assert_eq!(parse_seat("human=Ana", &ollama()).unwrap(), Seat::human("Ana"));
        assert_eq!(parse_seat("HUMAN", &ollama()).unwrap(), Seat::human("human"));
    }

    #[test]
    fn test_parse_rejects_empty_model() {
        assert!(parse_seat("@kiklop", &ollama()).is_err());
    }

    #[test]
    fn test_cli_parses_debate() {
        let cli = Cli::try_parse_from([
            "parley", "debate", "-s", "llama3", "-s", "mistral", "--rounds", "4", "-t",
            "brainstorm", "Opening",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Debate(args)) => {
                assert_eq!(args.seats, vec!["llama3", "mistral"]);
                assert_eq!(args.rounds, Some(4));
                assert_eq!(args.dialogue_type, Some(DialogueTypeArg::Brainstorm));
                assert_eq!(args.opening, "Opening");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["parley", "models", "-vv", "--no-config"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_config);
        assert!(matches!(cli.command, Some(Command::Models { backend: None })));
    }

    #[test]
    fn test_cli_parses_chat_system() {
        let cli = Cli::try_parse_from([
            "parley", "chat", "-m", "llama3", "--system", "Answer briefly.", "Hi",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Chat(args)) => {
                assert_eq!(args.system.as_deref(), Some("Answer briefly."));
                assert_eq!(args.message.as_deref(), Some("Hi"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_show_config_needs_no_subcommand() {
        let cli = Cli::try_parse_from(["parley", "--show-config"]).unwrap();
        assert!(cli.show_config);
        assert!(cli.command.is_none());
    }
}
