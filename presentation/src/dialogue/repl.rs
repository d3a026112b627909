//! REPL for moderating a running dialogue

use crate::ConsoleFormatter;
use crate::ProgressReporter;
use crate::config::ReplConfig;
use crate::interrupt::InterruptScope;
use colored::Colorize;
use parley_application::{
    AdvanceOutcome, DialogueError, DialogueUseCase, InferenceGateway, NoProgress,
    ProgressNotifier, TranscriptExporter,
};
use parley_domain::{ExportFormat, SessionId, TurnState};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;
use tracing::debug;

/// What a line typed at the dialogue prompt asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueCommand {
    Next,
    Run,
    Say(String),
    Moderate(String),
    Save(Option<ExportFormat>),
    Status,
    Help,
    Quit,
    /// Bare text: the human's turn if one is pending, otherwise a moderator note
    Text(String),
    Unknown(String),
}

impl DialogueCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if !line.starts_with('/') {
            return Some(Self::Text(line.to_string()));
        }

        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line, ""),
        };
        let command = match cmd {
            "/next" | "/n" => Self::Next,
            "/run" => Self::Run,
            "/say" if !arg.is_empty() => Self::Say(arg.to_string()),
            "/mod" if !arg.is_empty() => Self::Moderate(arg.to_string()),
            "/save" => match arg {
                "" => Self::Save(None),
                "text" | "txt" => Self::Save(Some(ExportFormat::Text)),
                "json" => Self::Save(Some(ExportFormat::Json)),
                _ => Self::Unknown(line.to_string()),
            },
            "/status" => Self::Status,
            "/help" | "/h" | "/?" => Self::Help,
            "/quit" | "/exit" | "/q" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        };
        Some(command)
    }
}

/// Interactive moderator console for one dialogue session
pub struct DebateRepl<G: InferenceGateway + 'static> {
    use_case: Arc<DialogueUseCase<G>>,
    session: SessionId,
    exporters: Vec<Arc<dyn TranscriptExporter>>,
    default_format: ExportFormat,
    config: ReplConfig,
}

impl<G: InferenceGateway + 'static> DebateRepl<G> {
    pub fn new(use_case: Arc<DialogueUseCase<G>>, session: SessionId) -> Self {
        Self {
            use_case,
            session,
            exporters: Vec::new(),
            default_format: ExportFormat::default(),
            config: ReplConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Exporters offered by `/save`; the first matching `default_format`
    /// is used when no format is named.
    pub fn with_exporters(
        mut self,
        exporters: Vec<Arc<dyn TranscriptExporter>>,
        default_format: ExportFormat,
    ) -> Self {
        self.exporters = exporters;
        self.default_format = default_format;
        self
    }

    /// Run model turns until the dialogue completes or waits for the human.
    pub async fn run_until_blocked(&self) -> Result<TurnState, DialogueError> {
        loop {
            let snapshot = self.use_case.snapshot(self.session, None).await?;
            match snapshot.state {
                TurnState::AwaitingTurn(_) => {}
                state => return Ok(state),
            }
            let outcome = self.advance_once().await?;
            if outcome.is_completed() {
                return Ok(TurnState::Completed);
            }
        }
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(path) = &self.config.history_file {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_help();
        self.print_prompt_hint().await;

        loop {
            match rl.readline("mod> ") {
                Ok(line) => {
                    let Some(command) = DialogueCommand::parse(&line) else {
                        continue;
                    };
                    let _ = rl.add_history_entry(line.trim());

                    if command == DialogueCommand::Quit {
                        println!("Bye!");
                        break;
                    }
                    if let Err(e) = self.execute(command).await {
                        eprintln!("{} {}", "Error:".red(), e);
                        if e.is_retryable() {
                            println!("{}", "The turn can be retried with /next".dimmed());
                        }
                    }
                    println!();
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(path) = &self.config.history_file
            && let Err(e) = rl.save_history(path)
        {
            debug!("Could not save history to {}: {}", path.display(), e);
        }

        Ok(())
    }

    async fn execute(&self, command: DialogueCommand) -> Result<(), DialogueError> {
        debug!("Session {}: {:?}", self.session, command);
        match command {
            DialogueCommand::Next => {
                self.advance_once().await?;
                self.print_prompt_hint().await;
            }
            DialogueCommand::Run => {
                self.run_until_blocked().await?;
                self.print_prompt_hint().await;
            }
            DialogueCommand::Say(text) => {
                self.use_case
                    .submit_human_turn(self.session, None, &text)
                    .await?;
                self.print_prompt_hint().await;
            }
            DialogueCommand::Moderate(text) => {
                self.use_case
                    .inject_moderator_message(self.session, None, &text)
                    .await?;
                println!("{}", "Moderator note added".dimmed());
            }
            DialogueCommand::Text(text) => {
                let snapshot = self.use_case.snapshot(self.session, None).await?;
                if matches!(snapshot.state, TurnState::AwaitingHumanInput(_)) {
                    self.use_case
                        .submit_human_turn(self.session, None, &text)
                        .await?;
                    self.print_prompt_hint().await;
                } else {
                    self.use_case
                        .inject_moderator_message(self.session, None, &text)
                        .await?;
                    println!("{}", "Moderator note added".dimmed());
                }
            }
            DialogueCommand::Save(format) => {
                let format = format.unwrap_or(self.default_format);
                match self.exporters.iter().find(|e| e.format() == format) {
                    Some(exporter) => {
                        let path = self
                            .use_case
                            .export(self.session, None, exporter.as_ref())
                            .await?;
                        println!("Transcript saved to {}", path.display());
                    }
                    None => println!("No {} exporter configured", format.extension()),
                }
            }
            DialogueCommand::Status => {
                let snapshot = self.use_case.snapshot(self.session, None).await?;
                println!("{}", ConsoleFormatter::format_status(&snapshot));
            }
            DialogueCommand::Help => self.print_help(),
            DialogueCommand::Quit => {}
            DialogueCommand::Unknown(line) => {
                println!("Unknown command: {}", line);
                println!("Type /help for available commands");
            }
        }
        Ok(())
    }

    async fn advance_once(&self) -> Result<AdvanceOutcome, DialogueError> {
        let interrupt = InterruptScope::start();
        let reporter = ProgressReporter::new();
        let progress: &dyn ProgressNotifier = if self.config.show_progress {
            &reporter
        } else {
            &NoProgress
        };

        let outcome = self
            .use_case
            .advance_with_progress(self.session, None, progress, interrupt.token())
            .await?;

        match &outcome {
            AdvanceOutcome::Turn { record, .. } if !self.config.show_progress => {
                println!("{}", ConsoleFormatter::format_turn(record));
            }
            AdvanceOutcome::Completed(_) => println!("The dialogue is already complete."),
            AdvanceOutcome::Turn { .. } => {}
        }
        Ok(outcome)
    }

    async fn print_prompt_hint(&self) {
        let Ok(snapshot) = self.use_case.snapshot(self.session, None).await else {
            return;
        };
        let hint = match snapshot.state {
            TurnState::NotStarted | TurnState::AwaitingTurn(_) => {
                format!(
                    "Round {}/{}: /next for the next speaker, /run to continue",
                    snapshot.rounds_completed, snapshot.max_rounds
                )
            }
            TurnState::AwaitingHumanInput(slot) => {
                format!("Your turn (participant{}): type your reply", slot)
            }
            TurnState::Completed => {
                "Dialogue complete. /save to keep the transcript, /quit to leave".to_string()
            }
        };
        println!("{}", hint.dimmed());
    }

    fn print_help(&self) {
        println!();
        println!("Commands:");
        println!("  /next            - Let the next model speak");
        println!("  /run             - Continue until your turn or the end");
        println!("  /say <text>      - Take your turn");
        println!("  /mod <text>      - Add a moderator note");
        println!("  /save [text|json]- Export the transcript");
        println!("  /status          - Show session state");
        println!("  /quit            - Leave");
        println!();
        println!("Plain text is your turn when one is pending, otherwise a moderator note.");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(DialogueCommand::parse("/next"), Some(DialogueCommand::Next));
        assert_eq!(DialogueCommand::parse("  /run "), Some(DialogueCommand::Run));
        assert_eq!(
            DialogueCommand::parse("/say I think so"),
            Some(DialogueCommand::Say("I think so".to_string()))
        );
        assert_eq!(
            DialogueCommand::parse("/mod Stay on topic"),
            Some(DialogueCommand::Moderate("Stay on topic".to_string()))
        );
        assert_eq!(DialogueCommand::parse("/quit"), Some(DialogueCommand::Quit));
    }

    #[test]
    fn test_parse_save_formats() {
        assert_eq!(DialogueCommand::parse("/save"), Some(DialogueCommand::Save(None)));
        assert_eq!(
            DialogueCommand::parse("/save json"),
            Some(DialogueCommand::Save(Some(ExportFormat::Json)))
        );
        assert!(matches!(
            DialogueCommand::parse("/save pdf"),
            Some(DialogueCommand::Unknown(_))
        ));
    }

    #[test]
    fn test_parse_text_and_blank() {
        assert_eq!(DialogueCommand::parse("   "), None);
        assert_eq!(
            DialogueCommand::parse("Hello there"),
            Some(DialogueCommand::Text("Hello there".to_string()))
        );
        // Missing argument is not a valid /say
        assert!(matches!(
            DialogueCommand::parse("/say"),
            Some(DialogueCommand::Unknown(_))
        ));
    }
}
