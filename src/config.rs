//! TOML configuration for the factory.
//!
//! Every section is optional. A missing config file yields
//! [`Config::default`], which reproduces the conventional layout:
//! `.speckit/seed.json`, `.speckit/{spec,plan,tasks}.md`, `AGENTS.md`,
//! an in-memory store, and the offline hashing embedder.
//!
//! ```toml
//! [paths]
//! speckit_dir = ".speckit"
//! seed = ".speckit/seed.json"
//! global_context = "AGENTS.md"
//!
//! [memory]
//! persist_dir = ".speckit/memory"
//! collection = "spec_chunks"
//!
//! [embedding]
//! provider = "hashing"
//!
//! [commands]
//! lint = ["uv", "run", "ruff", "check", "."]
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::memory::DEFAULT_N_RESULTS;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub memory: MemoryConfig,
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
    pub commands: CommandsConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the seed and the generated documents.
    pub speckit_dir: PathBuf,
    /// Seed file. Defaults to `<speckit_dir>/seed.json`.
    pub seed: Option<PathBuf>,
    /// Global context document included verbatim in every prompt.
    pub global_context: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            speckit_dir: PathBuf::from(".speckit"),
            seed: None,
            global_context: PathBuf::from("AGENTS.md"),
        }
    }
}

impl PathsConfig {
    pub fn seed_path(&self) -> PathBuf {
        self.seed
            .clone()
            .unwrap_or_else(|| self.speckit_dir.join("seed.json"))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MemoryConfig {
    /// On-disk store directory. `None` keeps the store in memory only.
    pub persist_dir: Option<PathBuf>,
    pub collection: String,
    pub chunk_by_headers: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            persist_dir: None,
            collection: default_collection(),
            chunk_by_headers: true,
        }
    }
}

pub fn default_collection() -> String {
    "spec_chunks".to_string()
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub n_results: usize,
    /// Query used by the build pipeline to exercise context assembly.
    pub sample_query: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            n_results: DEFAULT_N_RESULTS,
            sample_query: "project setup and initialization".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// `hashing`, `openai`, or `local`.
    pub provider: String,
    pub model: Option<String>,
    pub dims: Option<usize>,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hashing".to_string(),
            model: None,
            dims: None,
            batch_size: 64,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommandsConfig {
    /// Spec-Kit CLI binary, invoked as `<specify> init <project>`.
    pub specify: String,
    pub sync: Vec<String>,
    pub lint: Vec<String>,
    pub test: Vec<String>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            specify: "specify".to_string(),
            sync: argv(&["uv", "sync"]),
            lint: argv(&["uv", "run", "ruff", "check", "."]),
            test: argv(&["uv", "run", "pytest"]),
        }
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ValidationConfig {
    /// Fail the build when lint or tests fail.
    pub strict: bool,
}

/// Load and validate the config at `path`.
///
/// A missing file is not an error: the defaults are returned instead.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

/// Parse and validate config text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.retrieval.n_results < 1 {
        bail!("retrieval.n_results must be >= 1");
    }

    if config.memory.collection.trim().is_empty() {
        bail!("memory.collection must not be empty");
    }

    for (name, cmd) in [
        ("sync", &config.commands.sync),
        ("lint", &config.commands.lint),
        ("test", &config.commands.test),
    ] {
        if cmd.is_empty() {
            bail!("commands.{} must name a program", name);
        }
    }

    match config.embedding.provider.as_str() {
        "hashing" | "local" => {}
        "openai" => {
            if config.embedding.model.is_none() {
                bail!("embedding.model must be specified when provider is 'openai'");
            }
            if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
                bail!("embedding.dims must be > 0 when provider is 'openai'");
            }
        }
        other => bail!(
            "Unknown embedding provider: '{}'. Must be hashing, openai, or local.",
            other
        ),
    }

    if config.embedding.dims == Some(0) {
        bail!("embedding.dims must be > 0");
    }

    Ok(config)
}
