//! Command-line interface parsing and handling

pub mod chat;
pub mod indicator;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::chat::run_chat;
use crate::core::config::Config;
use crate::project::ProjectIndex;

/// Environment variable holding the diagnostic log filter.
pub const LOG_ENV: &str = "FERRET_LOG";

#[derive(Parser)]
#[command(name = "ferret", version)]
#[command(about = "A terminal chat client for local model servers")]
#[command(
    long_about = "Ferret is a line-mode chat client for an Ollama-style model server. \
Replies stream into the terminal with code blocks numbered so they can be copied, \
and a source tree can be indexed so questions are answered with the most relevant code.\n\n\
Commands:\n\
  /help                     Show all chat commands\n\
  /project add <folder>     Index a project directory\n\
  /project ask <question>   Ask about the indexed project\n\
  /file <path>              Send a file to the model\n\
  /copy <num>               Copy a code block from a reply\n\n\
Diagnostics go to stderr; set FERRET_LOG=debug for more detail."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to chat with
    #[arg(short = 'm', long, global = true)]
    pub model: Option<String>,

    /// Chat endpoint URL
    #[arg(short = 'u', long, global = true)]
    pub url: Option<String>,

    /// Persona key or number (skips the startup prompt)
    #[arg(short = 'p', long, global = true)]
    pub persona: Option<String>,

    /// Path to an alternative config.toml
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Index a directory and list what was found
    Index {
        /// Project directory
        dir: PathBuf,
    },
    /// Print the project prompt that would be sent for a question
    Context {
        /// Project directory
        dir: PathBuf,
        /// Question about the project
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    apply_overrides(&mut config, &args);

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(config).await,
        Commands::Index { dir } => print_index(&config, &dir),
        Commands::Context { dir, question } => print_context(&config, &dir, &question.join(" ")),
    }
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(url) = &args.url {
        config.api_url = url.clone();
    }
    if let Some(persona) = &args.persona {
        config.persona = Some(persona.clone());
    }
}

fn print_index(config: &Config, dir: &Path) -> Result<(), Box<dyn Error>> {
    let index = ProjectIndex::build(dir, &config.project.index_options())?;
    println!(
        "Indexed {} files, {} code blocks, {} chunks.",
        index.file_count(),
        index.block_count(),
        index.chunk_count()
    );
    for summary in index.list() {
        println!(
            "  - {} ({} chars, blocks: {}, chunks: {}, imports: {})",
            summary.path, summary.size, summary.blocks, summary.chunks, summary.imports
        );
    }
    let mut symbols: Vec<&str> = index.symbol_names().collect();
    if !symbols.is_empty() {
        symbols.sort_unstable();
        println!("Symbols: {}", symbols.join(", "));
    }
    Ok(())
}

fn print_context(config: &Config, dir: &Path, question: &str) -> Result<(), Box<dyn Error>> {
    let index = ProjectIndex::build(dir, &config.project.index_options())?;
    let retrieval = config.project.retriever().query(question, &index)?;
    for section in &retrieval.sections {
        eprintln!(
            "{:>5}  {} :: {} ({} chars)",
            section.score,
            section.path,
            section.display_name(),
            section.chars
        );
    }
    eprintln!(
        "Using {} files ({} chars){}.",
        retrieval.used_files.len(),
        retrieval.used_chars,
        if retrieval.fell_back { ", no strong matches" } else { "" }
    );
    print!("{}", retrieval.prompt(question));
    Ok(())
}
