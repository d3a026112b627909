//! REPL (Read-Eval-Print Loop) for single-model chat

use crate::ConsoleFormatter;
use crate::ProgressReporter;
use crate::config::ReplConfig;
use crate::interrupt::InterruptScope;
use colored::Colorize;
use parley_application::{
    ChatError, ChatReply, ChatRequest, ChatUseCase, InferenceGateway, NoProgress, SearchPort,
};
use parley_domain::{BackendId, Message, ModelId};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use tracing::debug;

/// What the model has been told so far in this chat
#[derive(Debug, Default)]
struct Conversation {
    system: Option<String>,
    turns: Vec<Message>,
}

impl Conversation {
    fn record(&mut self, question: &str, answer: &str) {
        self.turns.push(Message::user(question));
        self.turns.push(Message::assistant(answer));
    }

    /// Forget earlier turns; the system instruction stays.
    fn clear(&mut self) {
        self.turns.clear();
    }

    fn exchanges(&self) -> usize {
        self.turns.len() / 2
    }
}

/// Interactive chat REPL
pub struct ChatRepl<G: InferenceGateway + 'static, S: SearchPort + ?Sized + 'static> {
    use_case: ChatUseCase<G, S>,
    model: ModelId,
    source: BackendId,
    document: Option<String>,
    use_cache: bool,
    conversation: Conversation,
    config: ReplConfig,
}

impl<G: InferenceGateway + 'static, S: SearchPort + ?Sized + 'static> ChatRepl<G, S> {
    pub fn new(use_case: ChatUseCase<G, S>, model: ModelId, source: BackendId) -> Self {
        Self {
            use_case,
            model,
            source,
            document: None,
            use_cache: true,
            conversation: Conversation::default(),
            config: ReplConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Ground every question in this document text
    pub fn with_document(mut self, text: impl Into<String>) -> Self {
        self.document = Some(text.into());
        self
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Send this instruction as the system message of every request
    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.conversation.system = Some(instruction.into());
        self
    }

    /// Ask one question and print the answer.
    pub async fn ask_once(&mut self, message: &str) -> Result<(), ChatError> {
        self.process_message(message).await
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

        self.print_welcome();

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    if let Err(e) = self.process_message(line).await {
                        eprintln!("{} {}", "Error:".red(), e);
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

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│              Parley - Chat Mode             │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Model: {} @{}", self.model, self.source);
        if self.document.is_some() {
            println!("Answers are grounded in the loaded document.");
        }
        if let Some(system) = &self.conversation.system {
            println!("System: {}", system);
        }
        println!();
        println!("Commands:");
        println!("  /help            - Show this help");
        println!("  /model <name>    - Switch model");
        println!("  /system [text]   - Set or clear the system instruction");
        println!("  /clear           - Forget earlier turns");
        println!("  /cache on|off    - Toggle the response cache");
        println!("  /quit            - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&mut self, line: &str) -> bool {
        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line, ""),
        };

        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                true
            }
            "/help" | "/h" | "/?" => {
                self.print_welcome();
                false
            }
            "/model" => {
                if arg.is_empty() {
                    println!("Current model: {} @{}", self.model, self.source);
                } else {
                    self.model = ModelId::new(arg);
                    println!("Switched to {}", self.model);
                }
                false
            }
            "/system" => {
                if arg.is_empty() {
                    self.conversation.system = None;
                    println!("System instruction cleared");
                } else {
                    self.conversation.system = Some(arg.to_string());
                    println!("System instruction set");
                }
                false
            }
            "/clear" => {
                let dropped = self.conversation.exchanges();
                self.conversation.clear();
                println!("Forgot {} earlier exchange(s)", dropped);
                false
            }
            "/cache" => {
                match arg {
                    "on" => self.use_cache = true,
                    "off" => self.use_cache = false,
                    _ => {}
                }
                println!(
                    "Response cache: {}",
                    if self.use_cache { "on" } else { "off" }
                );
                false
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }

    fn build_request(&self, message: &str) -> ChatRequest {
        let mut request = ChatRequest::new(self.model.clone(), message)
            .with_source(self.source.clone())
            .with_history(self.conversation.turns.clone());
        if let Some(system) = &self.conversation.system {
            request = request.with_system(system.clone());
        }
        if let Some(document) = &self.document {
            request = request.with_document(document.clone());
        }
        if !self.use_cache {
            request = request.without_cache();
        }
        request
    }

    async fn process_message(&mut self, message: &str) -> Result<(), ChatError> {
        let reply = self.send(message).await?;
        self.conversation.record(message, &reply.response);
        Ok(())
    }

    async fn send(&self, message: &str) -> Result<ChatReply, ChatError> {
        let request = self.build_request(message);
        let interrupt = InterruptScope::start();

        if self.config.show_progress {
            let progress = ProgressReporter::new();
            let reply = self
                .use_case
                .execute_with_progress(request, &progress, interrupt.token())
                .await?;
            // Cached answers never stream
            if reply.cached {
                println!("{}", reply.response);
            }
            println!("{}", ConsoleFormatter::format_reply_meta(&reply));
            Ok(reply)
        } else {
            let reply = self
                .use_case
                .execute_with_progress(request, &NoProgress, interrupt.token())
                .await?;
            println!("{}", ConsoleFormatter::format_reply(&reply));
            Ok(reply)
        }
    }
}
