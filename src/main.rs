//! # Spec Factory CLI (`factory`)
//!
//! Drives the software-factory pipeline: bootstrap a project from its seed,
//! run the full build, and inspect the retrieval memory used for prompts.
//!
//! ## Usage
//!
//! ```bash
//! factory --config ./factory.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `factory bootstrap` | Load the seed and run `specify init` |
//! | `factory build` | Run the six-step build pipeline |
//! | `factory split <file>` | Show the header chunks of a markdown file |
//! | `factory index <files...>` | Index documents into the memory collection |
//! | `factory query "<text>"` | Retrieve the most similar chunks |
//! | `factory context "<text>"` | Print the assembled prompt context |
//! | `factory check-artifact <file>` | Validate a JSON code artifact |
//!
//! `index`, `query` and `context` only share state across invocations when
//! `memory.persist_dir` is configured.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use spec_factory::bootstrap::bootstrap_factory;
use spec_factory::config::{self, Config};
use spec_factory::context::build_context_string;
use spec_factory::embedding::create_embedder;
use spec_factory::memory::{create_store, MemoryStore};
use spec_factory::pipeline::run_build;
use spec_factory::signatures::parse_code_artifact;
use spec_factory_core::chunk::split_by_headers;

/// Spec Factory: a harness for spec-driven, AI-assisted code generation.
#[derive(Parser)]
#[command(name = "factory", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when it is absent.
    #[arg(long, global = true, default_value = "./factory.toml")]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the seed and initialize Spec-Kit.
    ///
    /// A missing `specify` CLI is logged and does not fail the command.
    Bootstrap,

    /// Run the build: sync, bootstrap, placeholders, memory, agent loop, validation.
    Build,

    /// Split a markdown file at `## ` headers and print each chunk.
    Split {
        file: PathBuf,

        /// Print the whole file as a single chunk.
        #[arg(long)]
        no_headers: bool,
    },

    /// Index documents into the configured collection.
    Index {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Retrieve the chunks most similar to a query.
    Query {
        query: String,

        /// Number of chunks to return (defaults to `retrieval.n_results`).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print the prompt context for a query.
    Context {
        query: String,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Validate a JSON code artifact and report syntax errors.
    CheckArtifact { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug,sqlx=warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Bootstrap => {
            let seed_path = cfg.paths.seed_path();
            match bootstrap_factory(&seed_path, &cfg.commands.specify).await? {
                Some(seed) => println!("Bootstrap complete: {}", seed.project_name()),
                None => bail!("Seed file not found: {}", seed_path.display()),
            }
        }
        Commands::Build => {
            let report = run_build(&cfg).await?;
            println!("Build complete: {}", report.project_name);
            println!("  documents written: {}", report.documents_written.len());
            println!("  chunks indexed:    {}", report.chunks_indexed);
            println!("  context chars:     {}", report.context_chars);
            println!("  tasks:             {}", report.tasks.len());
            println!(
                "  validation:        {}",
                if report.validation_ok() { "passed" } else { "failed" }
            );
        }
        Commands::Split { file, no_headers } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let chunks: Vec<&str> = if no_headers {
                vec![text.as_str()]
            } else {
                split_by_headers(&text).collect()
            };
            for (i, chunk) in chunks.iter().enumerate() {
                println!("--- chunk {} ({} chars)", i, chunk.chars().count());
                print!("{}", chunk);
                if !chunk.ends_with('\n') {
                    println!();
                }
            }
        }
        Commands::Index { files } => {
            let store = open_store(&cfg).await?;
            let result = async {
                let collection = store
                    .get_or_create_collection(&cfg.memory.collection)
                    .await?;
                for file in &files {
                    let n = collection
                        .index_document(file, cfg.memory.chunk_by_headers)
                        .await?;
                    println!("{}: {} chunks", file.display(), n);
                }
                anyhow::Ok(collection.count().await?)
            }
            .await;
            store.close().await?;
            println!("Collection {} holds {} chunks", cfg.memory.collection, result?);
        }
        Commands::Query { query, limit } => {
            let store = open_store(&cfg).await?;
            let result = async {
                let collection = store
                    .get_or_create_collection(&cfg.memory.collection)
                    .await?;
                let k = limit.unwrap_or(cfg.retrieval.n_results);
                anyhow::Ok(collection.retrieve(&query, k).await?)
            }
            .await;
            store.close().await?;

            let hits = result?;
            if hits.is_empty() {
                println!("No results.");
            }
            for (i, hit) in hits.iter().enumerate() {
                println!(
                    "{}. [{:.3}] {} ({})",
                    i + 1,
                    hit.score,
                    hit.id,
                    hit.metadata.source
                );
                let preview: String = hit
                    .document
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .chars()
                    .take(120)
                    .collect();
                println!("    {}", preview);
            }
        }
        Commands::Context { query, limit } => {
            let store = open_store(&cfg).await?;
            let result = async {
                let collection = store
                    .get_or_create_collection(&cfg.memory.collection)
                    .await?;
                let context = build_context_string(
                    &collection,
                    &query,
                    Some(cfg.paths.global_context.as_path()),
                    limit.unwrap_or(cfg.retrieval.n_results),
                )
                .await?;
                anyhow::Ok(context)
            }
            .await;
            store.close().await?;
            print!("{}", result?);
        }
        Commands::CheckArtifact { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let artifact = parse_code_artifact(&json)?;
            println!(
                "OK: {} ({}, {} dependencies)",
                artifact.filename,
                artifact.language(),
                artifact.dependencies.len()
            );
        }
    }

    Ok(())
}

async fn open_store(cfg: &Config) -> Result<MemoryStore> {
    let embedder = create_embedder(&cfg.embedding)?;
    create_store(cfg.memory.persist_dir.as_deref(), embedder).await
}
