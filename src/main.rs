//! flipdeck - turn a topic or a pasted term list into flip cards
//!
//! A terminal flashcard generator. Topics are expanded by a remote
//! text-generation service; `Term: Definition` lists are parsed directly.

mod config;
mod generator;
mod models;
mod parser;
mod pipeline;
mod resolver;
mod ui;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;
use generator::{GeminiClient, TextGenerator};
use ui::App;

// ══════════════════════════════════════════════════════════════════════════
// CLI Arguments
// ══════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug)]
#[command(name = "flipdeck")]
#[command(author, version, about = "Generate and flip term/definition flashcards", long_about = None)]
struct Args {
    /// Topic, or a "Term: Definition" list; pre-fills the input and generates on start
    input: Option<String>,

    /// Read the initial input from a file
    #[arg(short, long, conflicts_with = "input")]
    file: Option<PathBuf>,

    /// Model identifier for the generation service
    #[arg(short, long)]
    model: Option<String>,

    /// Base URL of the generation service
    #[arg(long)]
    api_base: Option<String>,

    /// API key for the generation service (falls back to $API_KEY)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Directory for log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Print the generated cards and exit instead of opening the TUI
    #[arg(short, long)]
    print: bool,

    /// With --print, emit a JSON array
    #[arg(long, requires = "print")]
    json: bool,
}

// ══════════════════════════════════════════════════════════════════════════
// Main Entry Point
// ══════════════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Guard must live until exit so buffered log lines are flushed
    let log_dir = args.log_dir.clone().unwrap_or_else(default_log_dir);
    let _log_guard = init_logging(&log_dir)?;

    let config = Config::load().unwrap_or_else(|e| {
        warn!("Using default config: {:#}", e);
        Config::default()
    });
    // Overrides apply to this run only; the stored config stays untouched
    let model = args.model.clone().unwrap_or_else(|| config.model.clone());
    let api_base = args.api_base.clone().unwrap_or_else(|| config.api_base.clone());

    let api_key = args
        .api_key
        .clone()
        .or_else(|| std::env::var("API_KEY").ok());
    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::new(
        api_base.clone(),
        model.clone(),
        api_key,
        config.timeout(),
    )?);
    info!(model = %model, api_base = %api_base, "flipdeck starting");

    let initial_input = initial_input(&args)?;

    if args.print {
        return run_print(&initial_input, generator.as_ref(), args.json).await;
    }

    run_tui(config, model, generator, initial_input)
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flipdeck")
        .join("logs")
}

fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", log_dir))?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "flipdeck.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}

fn initial_input(args: &Args) -> Result<String> {
    match (&args.file, &args.input) {
        (Some(path), _) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {:?}", path)),
        (None, Some(input)) => Ok(input.clone()),
        (None, None) => Ok(String::new()),
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Print Mode
// ══════════════════════════════════════════════════════════════════════════

async fn run_print(input: &str, generator: &dyn TextGenerator, json: bool) -> Result<()> {
    let outcome = pipeline::run(input, generator).await;
    if outcome.is_error() {
        bail!(outcome.message().unwrap_or_default());
    }

    let cards = outcome.into_cards();
    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
    } else {
        for card in &cards {
            println!("{}: {}", card.term, card.definition);
        }
    }
    Ok(())
}

// ══════════════════════════════════════════════════════════════════════════
// Terminal UI
// ══════════════════════════════════════════════════════════════════════════

fn run_tui(
    config: Config,
    model: String,
    generator: Arc<dyn TextGenerator>,
    initial_input: String,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, model, generator, initial_input);
    app.bootstrap();

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        return Err(err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| app.render(frame))?;
        app.handle_events()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_flag_parses_with_json() {
        let args = Args::try_parse_from(["flipdeck", "--print", "--json", "Colors"]).unwrap();
        assert!(args.print);
        assert!(args.json);
        assert_eq!(args.input.as_deref(), Some("Colors"));
    }

    #[test]
    fn json_requires_print() {
        assert!(Args::try_parse_from(["flipdeck", "--json", "Colors"]).is_err());
    }

    #[test]
    fn file_input_is_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.txt");
        fs::write(&path, "Hello: Hola\nGoodbye: Adiós\n").unwrap();

        let args =
            Args::try_parse_from(["flipdeck", "--file", path.to_str().unwrap()]).unwrap();
        assert_eq!(initial_input(&args).unwrap(), "Hello: Hola\nGoodbye: Adiós\n");
    }

    #[tokio::test]
    async fn print_mode_fails_on_unparseable_list() {
        let generator = resolver::tests::ScriptedGenerator::answering(Ok(None));
        let err = run_print("::\n::", &generator, false).await.unwrap_err();
        assert_eq!(err.to_string(), pipeline::NO_VALID_CARDS_MESSAGE);
    }
}
