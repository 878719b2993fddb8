//! LCA Chat - Terminal Surface for the LCA Assistant
//!
//! Line-based chat against the LCA knowledge backend. Answers and the busy
//! indicator are printed as the session reports them; logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Interactive chat against http://localhost:8000/chat
//! lca-chat
//!
//! # Another backend and model
//! lca-chat --endpoint http://lca.internal:8000/chat --model llama
//!
//! # One question, then exit
//! lca-chat --ask "What is Life Cycle Assessment?"
//!
//! # Verbose logging
//! RUST_LOG=debug lca-chat
//! ```

mod commands;
mod render;
mod suggestions;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use lca_conductor_core::{
    load_config, load_config_from_path, AnswerBackend, AssistantConfig, ConfigOverrides,
    HttpBackend, ModelId, SessionController, SessionUpdate,
};

use commands::{Command, HELP};

/// LCA Chat - ask the LCA knowledge base from the terminal
#[derive(Parser, Debug)]
#[command(name = "lca-chat")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Chat endpoint URL
    #[arg(short = 'e', long, value_name = "URL")]
    endpoint: Option<String>,

    /// Model for the first question (flan, llama)
    #[arg(short = 'm', long, value_name = "ID")]
    model: Option<ModelId>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "LCA_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(short = 't', long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "LCA_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Ask one question, print the answer and exit
    #[arg(short = 'a', long, value_name = "QUERY")]
    ask: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(ref endpoint) = self.endpoint {
            overrides = overrides.with_endpoint(endpoint.clone());
        }
        if let Some(model) = self.model {
            overrides = overrides.with_default_model(model);
        }
        if let Some(secs) = self.timeout_secs {
            overrides = overrides.with_request_timeout_secs(secs);
        }
        overrides
    }
}

/// Initialize logging with the specified level
///
/// Writes to stderr so log lines never mix with the conversation.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("lca_chat={level},lca_conductor_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve configuration: defaults, file, environment, then flags
fn resolve_config(args: &Args) -> Result<AssistantConfig> {
    let mut config = match args.config {
        Some(ref path) => load_config_from_path(Some(path.as_path())),
        None => load_config(),
    }
    .context("Failed to load configuration")?;

    args.overrides()
        .apply(&mut config)
        .context("Invalid command-line option")?;

    info!(
        source = %config.source(),
        endpoint = %config.endpoint,
        model = %config.default_model,
        "Configuration resolved"
    );
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = resolve_config(&args)?;
    let backend = HttpBackend::new(config.endpoint.clone())
        .context("Failed to set up the backend client")?;
    let session = SessionController::new(backend, &config);

    let result = match args.ask {
        Some(ref query) => ask_once(&session, query).await,
        None => run_interactive(&session).await,
    };

    session.shutdown();
    result
}

/// Submit one query, print the answer
async fn ask_once<B: AnswerBackend + 'static>(
    session: &SessionController<B>,
    query: &str,
) -> Result<()> {
    let outcome = session.submit_query(query);
    if let Some(notice) = outcome.notice() {
        anyhow::bail!(notice);
    }
    if !outcome.is_accepted() {
        anyhow::bail!("Nothing to ask");
    }

    session.settled().await;
    if let Some(turn) = session.last_turn() {
        println!("{}", render::format_turn(&turn));
    }
    Ok(())
}

/// Print updates as the session reports them until it closes
async fn render_updates(mut updates: tokio::sync::broadcast::Receiver<SessionUpdate>) {
    loop {
        match updates.recv().await {
            Ok(update) => {
                if let Some(line) = render::format_update(&update) {
                    println!("{line}");
                }
                if matches!(update, SessionUpdate::Closed) {
                    break;
                }
            }
            Err(RecvError::Closed) => break,
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "Renderer fell behind");
            }
        }
    }
}

/// Read lines from stdin until `/quit`, EOF or Ctrl-C
async fn run_interactive<B: AnswerBackend + 'static>(session: &SessionController<B>) -> Result<()> {
    for turn in session.turns() {
        println!("{}", render::format_turn(&turn));
    }
    println!(
        "Model: {}. Type /help for commands, /examples for ideas.",
        session.selected_model().label()
    );

    let renderer = tokio::spawn(render_updates(session.subscribe()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        };

        let Some(line) = line else {
            debug!("End of input");
            break;
        };

        if !handle_line(session, &line) {
            break;
        }
    }

    session.shutdown();
    let _ = renderer.await;
    Ok(())
}

/// Act on one input line; returns false when the user wants to leave
fn handle_line<B: AnswerBackend + 'static>(session: &SessionController<B>, line: &str) -> bool {
    let command = match commands::parse(line) {
        Ok(command) => command,
        Err(e) => {
            println!("{e}");
            return true;
        }
    };

    match command {
        Command::Help => println!("{HELP}"),
        Command::Models => println!("{}", render::format_models(session.selected_model())),
        Command::Model(model) => session.set_model(model),
        Command::Examples => print!("{}", suggestions::render_catalog()),
        Command::Ask(n) => match suggestions::example(n) {
            Some(query) => submit(session, query, true),
            None => println!("No example number {n}; see /examples."),
        },
        Command::History => {
            for turn in session.turns() {
                println!("{}", render::format_turn(&turn));
            }
        }
        Command::Quit => return false,
        Command::Query(text) => submit(session, &text, false),
    }
    true
}

/// Submit a query; `echo` prints it as the user's line once accepted
fn submit<B: AnswerBackend + 'static>(session: &SessionController<B>, text: &str, echo: bool) {
    let outcome = session.submit_query(text);
    if let Some(line) = render::format_submission(text, &outcome, echo) {
        println!("{line}");
    }
}
