//! hybrid-context - query a set of document agents from the command line.
//!
//! ## Commands
//!
//! - `repl`: interactive query loop (default)
//! - `query`: answer a single query and exit
//! - `update`: merge a JSON object into one agent's context
//! - `hash-secret` / `verify-secret`: salted secret hashing helpers

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{info, Level};

use hybrid_context::interface::{render_outcome, Repl};
use hybrid_context::reporting::{ErrorLog, ErrorReporter, ReportExt};
use hybrid_context::security::{hash_secret, verify_secret};
use hybrid_context::telemetry::init_tracing;
use hybrid_context::{AgentRegistry, KeywordStrategy, Settings};

#[derive(Parser)]
#[command(name = "hybrid-context")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Route free-text queries to per-topic document agents", long_about = None)]
struct Cli {
    /// Agent manifest file
    #[arg(long, global = true, env = "HYBRID_CONTEXT_DATABASE")]
    database: Option<PathBuf>,

    /// Directory holding per-agent context files
    #[arg(long, global = true, env = "HYBRID_CONTEXT_DOCUMENTS_DIR")]
    documents_dir: Option<PathBuf>,

    /// Append-only error log
    #[arg(long, global = true, env = "HYBRID_CONTEXT_ERROR_LOG")]
    error_log: Option<PathBuf>,

    /// Maximum number of entries per agent context
    #[arg(long, global = true, env = "HYBRID_CONTEXT_MAX_CONTEXT_SIZE")]
    max_context_size: Option<usize>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive query loop
    Repl,

    /// Answer a single query
    Query {
        /// Query text
        text: String,
    },

    /// Merge a JSON object into an agent's context and persist it
    Update {
        /// Agent identifier
        agent: String,

        /// JSON object of context entries
        context: String,
    },

    /// Print a salted hash of a secret
    HashSecret { plaintext: String },

    /// Check a secret against a stored hash
    VerifySecret { stored: String, candidate: String },
}

impl Cli {
    /// Defaults overlaid with the command line; not yet validated.
    fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        if let Some(p) = &self.database {
            settings.database = p.clone();
        }
        if let Some(p) = &self.documents_dir {
            settings.documents_dir = p.clone();
        }
        if let Some(p) = &self.error_log {
            settings.error_log = p.clone();
        }
        if let Some(n) = self.max_context_size {
            settings.max_context_size = n;
        }
        settings
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json, level);

    let settings = cli.settings();
    let error_log = if settings.error_log.as_os_str().is_empty() {
        Settings::default().error_log
    } else {
        settings.error_log.clone()
    };
    let reporter: Arc<dyn ErrorReporter> = Arc::new(ErrorLog::new(error_log));
    settings
        .validate()
        .reported(reporter.as_ref(), "validating settings")
        .context("Invalid settings")?;

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => cmd_repl(&settings, reporter),
        Commands::Query { text } => cmd_query(&settings, reporter, &text),
        Commands::Update { agent, context } => cmd_update(&settings, reporter, &agent, &context),
        Commands::HashSecret { plaintext } => {
            println!("{}", hash_secret(&plaintext));
            Ok(())
        }
        Commands::VerifySecret { stored, candidate } => {
            let matches = verify_secret(&stored, &candidate);
            println!("{matches}");
            if !matches {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn load_registry(settings: &Settings, reporter: Arc<dyn ErrorReporter>) -> Result<AgentRegistry> {
    AgentRegistry::load(settings, KeywordStrategy, reporter.clone())
        .reported(reporter.as_ref(), "loading agents")
        .with_context(|| format!("Failed to load agents from {}", settings.database.display()))
}

fn cmd_repl(settings: &Settings, reporter: Arc<dyn ErrorReporter>) -> Result<()> {
    let registry = load_registry(settings, reporter.clone())?;
    let mut repl = Repl::new(registry, reporter);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    repl.write_instructions(&mut out)?;
    let summary = repl.run(io::stdin().lock(), &mut out)?;
    info!(queries = summary.queries, quit = summary.quit, "session ended");

    repl.into_handler().flush();
    Ok(())
}

fn cmd_query(settings: &Settings, reporter: Arc<dyn ErrorReporter>, text: &str) -> Result<()> {
    let registry = load_registry(settings, reporter)?;
    let outcome = registry.run_query(text);
    println!("{}", render_outcome(&outcome)?);
    Ok(())
}

fn cmd_update(
    settings: &Settings,
    reporter: Arc<dyn ErrorReporter>,
    agent: &str,
    context: &str,
) -> Result<()> {
    let update = match serde_json::from_str::<Value>(context).context("Context is not valid JSON")? {
        Value::Object(map) => map,
        other => bail!("Context must be a JSON object, got {other}"),
    };

    let mut registry = load_registry(settings, reporter.clone())?;
    let entries = update.len();
    registry
        .update_context(agent, update)
        .reported(reporter.as_ref(), "updating context")?;
    info!(agent = %agent, entries, "context updated");
    Ok(())
}
