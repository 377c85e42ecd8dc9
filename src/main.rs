//! Precis CLI
//!
//! Commands:
//!   run    - Summarize every PDF in a directory
//!   file   - Summarize a single PDF
//!   chunks - Show how a PDF would be chunked (no API calls)
//!   init   - Write a default config file
//!   config - Print the effective configuration

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use precis::{
    discover_pdfs, run_init, ChunkUnit, Config, ConfigError, DocumentError, Error, InitResult,
    InvalidArgument, OpenAIProvider, Pipeline, PdfExtractor, PromptStyle, TextExtractor,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 64;
const EXIT_CONFIG: u8 = 78;
const EXIT_CANCELLED: u8 = 130;

const PREVIEW_CHARS: usize = 60;

#[derive(Parser)]
#[command(name = "precis")]
#[command(about = "Summarize PDF documents with a chat-completion model")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.precis/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log more (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize every PDF directly inside a directory
    Run {
        /// Directory holding the PDFs
        dir: PathBuf,

        #[command(flatten)]
        overrides: Overrides,

        /// Exit with status 1 if any document failed
        #[arg(long)]
        strict: bool,
    },

    /// Summarize a single PDF
    File {
        /// PDF to summarize
        path: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Extract and chunk a PDF without calling the model
    Chunks {
        /// PDF to chunk
        path: PathBuf,

        #[command(flatten)]
        chunking: ChunkingArgs,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Config {
        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(Args, Default)]
struct ChunkingArgs {
    /// Maximum units per chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Unit the chunk size is measured in
    #[arg(long, value_enum)]
    unit: Option<ChunkUnit>,
}

impl ChunkingArgs {
    fn apply(self, config: &mut Config) {
        if let Some(size) = self.chunk_size {
            config.chunking.size = size;
        }
        if let Some(unit) = self.unit {
            config.chunking.unit = unit;
        }
    }
}

/// Command-line values that replace config file settings
#[derive(Args, Default)]
struct Overrides {
    #[command(flatten)]
    chunking: ChunkingArgs,

    /// Appended to the PDF stem to name the summary file
    #[arg(long)]
    suffix: Option<String>,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    temperature: Option<f32>,

    #[arg(long)]
    max_tokens: Option<u32>,

    #[arg(long, allow_hyphen_values = true)]
    frequency_penalty: Option<f32>,

    #[arg(long, allow_hyphen_values = true)]
    presence_penalty: Option<f32>,

    /// Built-in prompt wording
    #[arg(long, value_enum)]
    prompt: Option<PromptStyle>,

    /// Prefix each summary block with "Summary N:"
    #[arg(long)]
    numbered: bool,

    /// Write every chunk sent to the model to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Retries for rate limits, server errors, and timeouts
    #[arg(long)]
    max_retries: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long)]
    api_base: Option<String>,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        self.chunking.apply(config);

        if let Some(suffix) = self.suffix {
            config.output.suffix = suffix;
        }
        if let Some(model) = self.model {
            config.model.name = model;
        }
        if let Some(t) = self.temperature {
            config.model.temperature = t;
        }
        if let Some(n) = self.max_tokens {
            config.model.max_tokens = Some(n);
        }
        if let Some(p) = self.frequency_penalty {
            config.model.frequency_penalty = p;
        }
        if let Some(p) = self.presence_penalty {
            config.model.presence_penalty = p;
        }
        if let Some(style) = self.prompt {
            config.prompt.style = style;
        }
        if self.numbered {
            config.output.numbered = true;
        }
        if let Some(trace) = self.trace {
            config.output.trace_file = Some(trace);
        }
        if let Some(n) = self.max_retries {
            config.retry.max_retries = n;
        }
        if let Some(secs) = self.timeout {
            config.model.timeout_secs = secs;
        }
        if let Some(base) = self.api_base {
            config.model.api_base = base;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if cause.downcast_ref::<ConfigError>().is_some() {
            return EXIT_CONFIG;
        }
        if cause.downcast_ref::<InvalidArgument>().is_some() {
            return EXIT_USAGE;
        }
        if let Some(e) = cause.downcast_ref::<Error>() {
            return match e {
                Error::Config(_) => EXIT_CONFIG,
                Error::InvalidArgument(_) => EXIT_USAGE,
                Error::Io { .. } => EXIT_FAILURE,
            };
        }
    }
    EXIT_FAILURE
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run {
            dir,
            overrides,
            strict,
        } => {
            let config = load_config(config_path, overrides)?;
            // Credential first: nothing is opened without it
            let api_key = config.api_key()?;

            let documents = discover_pdfs(&dir)?;
            if documents.is_empty() {
                println!("No PDF files found in {}", dir.display());
                return Ok(ExitCode::SUCCESS);
            }
            println!(
                "Summarizing {} PDF file(s) in {}\n",
                documents.len(),
                dir.display()
            );

            let token = cancel_on_ctrl_c();
            let pipeline = build_pipeline(&config, api_key, cli.quiet, token)?;
            let report = pipeline.process_directory(&dir).await?;
            report.print();

            if report.cancelled {
                Ok(ExitCode::from(EXIT_CANCELLED))
            } else if strict && report.has_failures() {
                Ok(ExitCode::from(EXIT_FAILURE))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }

        Commands::File { path, overrides } => {
            let config = load_config(config_path, overrides)?;
            let api_key = config.api_key()?;

            check_input_file(&path)?;

            let token = cancel_on_ctrl_c();
            let pipeline = build_pipeline(&config, api_key, cli.quiet, token)?;

            match pipeline.process_document(&path).await {
                Ok(summary) => {
                    println!(
                        "{} {} -> {} ({} chunks, {} tokens)",
                        "✓".green(),
                        path.display(),
                        summary.output.display(),
                        summary.chunks,
                        summary.usage.total_tokens
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Err(DocumentError::Cancelled) => {
                    println!("{} {} (cancelled)", "-".dimmed(), path.display());
                    Ok(ExitCode::from(EXIT_CANCELLED))
                }
                Err(e) => {
                    println!("{} {} [{}] {}", "✗".red(), path.display(), e.kind().red(), e);
                    Ok(ExitCode::from(EXIT_FAILURE))
                }
            }
        }

        Commands::Chunks { path, chunking } => {
            let mut config = Config::load(config_path)?;
            chunking.apply(&mut config);
            let chunker = config.chunker()?;

            let source = path.clone();
            let text = tokio::task::spawn_blocking(move || PdfExtractor::new().extract(&source))
                .await
                .context("Extraction task failed")??;

            let chunks = chunker.chunk(&text);
            println!(
                "{}: {} {} in {} chunk(s) of at most {}",
                path.display(),
                chunker.unit_count(&text),
                chunker.unit().name(),
                chunks.len(),
                chunker.size()
            );
            for chunk in &chunks {
                println!(
                    "  {} {}",
                    format!("[{}]", chunk.index + 1).cyan(),
                    preview(&chunk.content)
                );
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Init { force } => {
            match run_init(config_path, force)? {
                InitResult::Configured(path) => {
                    println!("{} Config written to {}", "✓".green(), path.display());
                }
                InitResult::AlreadyExists(path) => {
                    println!(
                        "Config already exists at {} (use --force to overwrite)",
                        path.display()
                    );
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Config { overrides } => {
            let config = load_config(config_path, overrides)?;
            print!("{}", config.to_toml()?);

            let key_status = if config.api_key().is_ok() {
                "set".green()
            } else {
                "not set".yellow()
            };
            println!("\n# {}: {}", config.model.api_key_env, key_status);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn check_input_file(path: &Path) -> Result<(), ConfigError> {
    let reason = if !path.exists() {
        "does not exist"
    } else if !path.is_file() {
        "is not a file"
    } else {
        return Ok(());
    };
    Err(ConfigError::InputFile {
        path: path.to_path_buf(),
        reason,
    })
}

fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<Config> {
    let mut config = Config::load(path)?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn build_pipeline(
    config: &Config,
    api_key: String,
    quiet: bool,
    token: CancellationToken,
) -> Result<Pipeline> {
    let provider = OpenAIProvider::new(api_key, &config.model.api_base, config.request_timeout())
        .context("Failed to build HTTP client")?;

    let pipeline = Pipeline::from_config(config, Arc::new(provider))?.with_cancellation(token);
    Ok(if quiet { pipeline.quiet() } else { pipeline })
}

/// Cancel the returned token on the first Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let handle = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!(
                "\n{} stopping after the current request; the document in progress is not written",
                "Cancelling:".yellow().bold()
            );
            handle.cancel();
        }
    });
    token
}

fn preview(content: &str) -> String {
    let flat: String = content
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    let mut out: String = flat.chars().take(PREVIEW_CHARS).collect();
    if flat.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}
