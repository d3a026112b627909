//! CLI entrypoint for parley
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use parley_application::{
    ChatUseCase, Clock, ConversationLogger, DialogueUseCase, ModelCatalog, ResponseCache,
    SearchPort, StartDialogue, SystemClock, TranscriptExporter,
};
use parley_domain::{BackendId, DocumentSource, ExportFormat, ModelId, Seat};
use parley_infrastructure::{
    ConfigLoader, FileConfig, FileTranscriptExporter, JsonlConversationLogger, OllamaGateway,
    build_search,
};
use parley_presentation::{
    ChatArgs, ChatRepl, Cli, Command, ConsoleFormatter, DebateArgs, DebateRepl,
    ReplConfig, parse_seat,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;
    info!("Starting parley");

    let config = load_config(cli.config.as_ref(), cli.no_config)?;

    let Some(command) = cli.command else {
        bail!("No command given. Run `parley --help` for usage.");
    };

    // === Dependency Injection ===
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let gateway = Arc::new(OllamaGateway::new(config.backends.host_table())?);
    let cache_params = config.cache.to_params();
    let catalog = Arc::new(ModelCatalog::new(
        gateway.clone(),
        clock.clone(),
        cache_params.model_list_ttl,
    ));
    let conversation_logger = open_conversation_logger(&config);

    match command {
        Command::Chat(args) => {
            let (provider, _) = config.search.parse_provider();
            let search = build_search(provider, config.search.brave_api_key.as_deref());
            let cache = Arc::new(ResponseCache::new(&cache_params, clock.clone()));

            let mut use_case = ChatUseCase::new(gateway, catalog, search, cache)
                .with_detector(config.uncertainty.detector())
                .with_augmentation(config.uncertainty.to_params())
                .with_generation(config.generation.to_params());
            if let Some(logger) = conversation_logger {
                use_case = use_case.with_conversation_logger(logger);
            }

            run_chat(use_case, args, &config, cli.quiet).await
        }
        Command::Debate(args) => {
            let mut use_case = DialogueUseCase::new(
                gateway,
                catalog,
                clock,
                config.dialogue.to_params(),
            )
            .with_personas(config.persona_catalog())
            .with_generation(config.generation.to_params());
            if let Some(logger) = conversation_logger {
                use_case = use_case.with_conversation_logger(logger);
            }

            run_debate(Arc::new(use_case), args, &config, cli.quiet).await
        }
        Command::Models { backend } => {
            let backend = backend
                .map(BackendId::new)
                .unwrap_or_else(|| config.backends.default_backend());
            let models = catalog.models(&backend).await?;
            print!("{}", ConsoleFormatter::format_models(&backend, &models));
            Ok(())
        }
        Command::Personas => {
            print!(
                "{}",
                ConsoleFormatter::format_personas(&config.persona_catalog().summaries())
            );
            Ok(())
        }
    }
}

/// Install the diagnostics subscriber. The returned guard flushes the
/// log file on drop and must live until exit.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // -v flags win over RUST_LOG
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("--log-file {} has no file name", path.display()))?;
            std::fs::create_dir_all(directory)
                .with_context(|| format!("cannot create {}", directory.display()))?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            Ok(None)
        }
    }
}

fn load_config(path: Option<&PathBuf>, no_config: bool) -> Result<FileConfig> {
    let config = if no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(path).map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?
    };

    let (_, type_issues) = config.dialogue.parse_default_type();
    match config.validate_strict() {
        Ok(warnings) => {
            for issue in warnings.iter().chain(type_issues.iter()) {
                eprintln!("{}", ConsoleFormatter::format_issue(issue));
            }
        }
        Err(e) => {
            for issue in &e.issues {
                eprintln!("{}", ConsoleFormatter::format_issue(issue));
            }
            bail!(e);
        }
    }
    Ok(config)
}

fn open_conversation_logger(config: &FileConfig) -> Option<Arc<dyn ConversationLogger>> {
    let path = config.export.conversation_log_path()?;
    match JsonlConversationLogger::open(&path) {
        Ok(logger) => {
            info!("Conversation log: {}", path.display());
            Some(Arc::new(logger))
        }
        Err(e) => {
            warn!("Cannot open conversation log {}: {}", path.display(), e);
            None
        }
    }
}

async fn run_chat<S>(
    use_case: ChatUseCase<OllamaGateway, S>,
    args: ChatArgs,
    config: &FileConfig,
    quiet: bool,
) -> Result<()>
where
    S: SearchPort + ?Sized + 'static,
{
    let backend = args
        .backend
        .map(BackendId::new)
        .unwrap_or_else(|| config.backends.default_backend());

    let mut repl = ChatRepl::new(use_case, ModelId::new(args.model), backend)
        .with_cache(!args.no_cache)
        .with_config(ReplConfig::default().with_progress(!quiet));
    if let Some(path) = &args.document {
        repl = repl.with_document(read_document(path)?);
    }
    if let Some(system) = args.system {
        repl = repl.with_system(system);
    }

    match args.message {
        Some(message) => repl.ask_once(&message).await?,
        None => repl.run().await?,
    }
    Ok(())
}

async fn run_debate(
    use_case: Arc<DialogueUseCase<OllamaGateway>>,
    args: DebateArgs,
    config: &FileConfig,
    quiet: bool,
) -> Result<()> {
    let default_backend = config.backends.default_backend();
    let seats = args
        .seats
        .iter()
        .map(|raw| parse_seat(raw, &default_backend))
        .collect::<std::result::Result<Vec<Seat>, String>>()
        .map_err(anyhow::Error::msg)?;

    let mut input = StartDialogue::from_seats(seats, args.opening);
    input = input.with_dialogue_type(match args.dialogue_type {
        Some(arg) => arg.into(),
        None => config.dialogue.parse_default_type().0,
    });
    if let Some(topic) = args.topic {
        input = input.with_topic(topic);
    }
    if let Some(rounds) = args.rounds {
        input = input.with_max_rounds(rounds);
    }

    let snapshot = use_case.start(input).await?;
    println!("{}", ConsoleFormatter::format_session_header(&snapshot));

    let default_format: ExportFormat = args
        .export_format
        .map(Into::into)
        .unwrap_or(config.export.format);
    let directory = config.export.directory_path();
    let exporters: Vec<Arc<dyn TranscriptExporter>> = vec![
        Arc::new(FileTranscriptExporter::new(&directory, ExportFormat::Text)),
        Arc::new(FileTranscriptExporter::new(&directory, ExportFormat::Json)),
    ];

    let mut repl = DebateRepl::new(use_case.clone(), snapshot.session_id)
        .with_exporters(exporters.clone(), default_format)
        .with_config(
            ReplConfig {
                history_file: ReplConfig::default_history("debate_history.txt"),
                ..ReplConfig::default()
            }
            .with_progress(!quiet),
        );

    if args.auto {
        let state = repl.run_until_blocked().await?;
        info!("Auto run stopped in state {}", state.as_str());
        if let Some(exporter) = exporters.iter().find(|e| e.format() == default_format) {
            let path = use_case
                .export(snapshot.session_id, None, exporter.as_ref())
                .await?;
            println!("Transcript saved to {}", path.display());
        }
        if state.slot().is_some() {
            // Stopped at the human seat; hand over to the console
            repl.run().await?;
        }
        return Ok(());
    }

    repl.run().await?;
    Ok(())
}

/// Plain text of a document passed with `--document`.
fn read_document(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let source = DocumentSource::from_upload(bytes, mime_type_for(path));
    match source.plain_text() {
        Some(text) => Ok(text),
        None => bail!(
            "{}: {} documents are not supported, convert to plain text first",
            path.display(),
            source.kind()
        ),
    }
}

fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("txt") | Some("text") | Some("log") => "text/plain",
        Some("md") | Some("markdown") => "text/markdown",
        Some("pdf") => "application/pdf",
        Some("epub") => "application/epub+zip",
        _ => "application/octet-stream",
    }
}
