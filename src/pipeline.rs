//! Linear build orchestration.
//!
//! ```text
//! 1. sync environment      ── failure aborts
//! 2. bootstrap from seed   ── missing seed aborts
//! 3. placeholder documents (only those missing)
//! 4. memory: index spec.md, plan.md, tasks.md; sample context
//! 5. agent loop: per task, assemble context and the code prompt
//! 6. lint + test           ── reported; fatal only in strict mode
//! ```
//!
//! Steps run one after another on the caller's task. The memory store is
//! closed before [`run_build`] returns, whether or not step 4 or 5 failed.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::bootstrap::bootstrap_factory;
use crate::config::Config;
use crate::context::build_context_string;
use crate::embedding::create_embedder;
use crate::memory::{create_store, MemoryStore};
use crate::placeholders::{generate_missing, DOCUMENTS, PLAN_FILE, TASKS_FILE};
use crate::signatures::GENERATE_CODE;
use crate::steps::run_step;
use crate::tasks::parse_task_list;

/// Summary of one build run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub project_name: String,
    /// Placeholder documents created in step 3.
    pub documents_written: Vec<PathBuf>,
    /// Total chunks indexed across all documents.
    pub chunks_indexed: usize,
    /// Length in characters of the sample-query context.
    pub context_chars: usize,
    /// Task ids visited by the agent loop, in order.
    pub tasks: Vec<String>,
    pub lint_ok: bool,
    pub tests_ok: bool,
}

impl BuildReport {
    pub fn validation_ok(&self) -> bool {
        self.lint_ok && self.tests_ok
    }
}

/// Run the full build described by `config`.
pub async fn run_build(config: &Config) -> Result<BuildReport> {
    let speckit_dir = config.paths.speckit_dir.as_path();

    tracing::info!("Step 1: Syncing environment");
    if !run_step("environment sync", &config.commands.sync).await {
        bail!("Environment sync failed");
    }

    tracing::info!("Step 2: Bootstrapping from seed");
    let seed_path = config.paths.seed_path();
    let seed = bootstrap_factory(&seed_path, &config.commands.specify)
        .await?
        .with_context(|| format!("Seed file not found: {}", seed_path.display()))?;

    let mut report = BuildReport {
        project_name: seed.project_name().to_string(),
        ..BuildReport::default()
    };

    tracing::info!("Step 3: Generating spec artifacts");
    report.documents_written = generate_missing(&seed, speckit_dir).with_context(|| {
        format!("Failed to write spec artifacts in {}", speckit_dir.display())
    })?;

    tracing::info!("Step 4: Initializing memory store");
    let embedder = create_embedder(&config.embedding)?;
    let store = create_store(config.memory.persist_dir.as_deref(), embedder).await?;
    let memory_result = index_and_plan(config, speckit_dir, &store, &mut report).await;
    finish_memory(memory_result, store.close().await)?;

    tracing::info!("Step 6: Validation");
    report.lint_ok = run_step("lint", &config.commands.lint).await;
    report.tests_ok = run_step("tests", &config.commands.test).await;

    if !report.validation_ok() {
        if config.validation.strict {
            bail!(
                "Validation failed (lint: {}, tests: {})",
                pass_fail(report.lint_ok),
                pass_fail(report.tests_ok)
            );
        }
        tracing::warn!("Validation failed. The debugger agent would be invoked here.");
    }

    tracing::info!("Build orchestration complete");
    Ok(report)
}

/// Steps 4 and 5: index the documents, build the sample context, and walk
/// the task list.
async fn index_and_plan(
    config: &Config,
    speckit_dir: &Path,
    store: &MemoryStore,
    report: &mut BuildReport,
) -> Result<()> {
    let collection = store
        .get_or_create_collection(&config.memory.collection)
        .await?;
    for name in DOCUMENTS {
        let chunks = collection
            .index_document(&speckit_dir.join(name), config.memory.chunk_by_headers)
            .await?;
        report.chunks_indexed += chunks;
    }

    let global = config.paths.global_context.as_path();
    let n_results = config.retrieval.n_results;
    let context = build_context_string(
        &collection,
        &config.retrieval.sample_query,
        Some(global),
        n_results,
    )
    .await?;
    report.context_chars = context.chars().count();
    tracing::info!("Context built: {} characters", report.context_chars);

    tracing::info!("Step 5: Agent loop");
    let tasks_md = read_if_exists(&speckit_dir.join(TASKS_FILE))?;
    let plan_md = read_if_exists(&speckit_dir.join(PLAN_FILE))?;
    for task in parse_task_list(&tasks_md) {
        if task.done {
            tracing::debug!(task = %task.id, "already done, skipping");
            continue;
        }
        let task_line = format!("{}: {}", task.id, task.title);
        let context = build_context_string(&collection, &task.title, Some(global), n_results).await?;
        let prompt = GENERATE_CODE.render(&[
            ("context", context.as_str()),
            ("task", task_line.as_str()),
            ("plan", plan_md.as_str()),
        ])?;
        tracing::info!(
            task = %task.id,
            phase = %task.phase,
            context_chars = context.chars().count(),
            prompt_chars = prompt.chars().count(),
            "prepared code generation prompt"
        );
        report.tasks.push(task.id);
    }

    Ok(())
}

/// Combine the outcome of steps 4-5 with closing the store. A memory
/// error wins over a close error, which is then only logged.
fn finish_memory(memory_result: Result<()>, close_result: Result<()>) -> Result<()> {
    match (memory_result, close_result) {
        (Err(e), Err(close_err)) => {
            tracing::warn!("Failed to close memory store: {:#}", close_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), close_result) => close_result.context("Failed to close memory store"),
    }
}

fn read_if_exists(path: &Path) -> Result<String> {
    if !path.exists() {
        return Ok(String::new());
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn pass_fail(ok: bool) -> &'static str {
    if ok {
        "passed"
    } else {
        "failed"
    }
}
