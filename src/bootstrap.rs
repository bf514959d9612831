//! Spec-Kit bootstrap for headless runs.
//!
//! Loads the seed and initializes a Spec-Kit project through the
//! `specify` CLI. The CLI is optional: when it is missing or fails the
//! problem is logged and bootstrapping continues.

use anyhow::Result;
use std::io::ErrorKind;
use std::path::Path;
use tokio::process::Command;

use crate::seed::{load_seed, Seed, SeedError};

/// Intent text longer than this is truncated in log output.
const INTENT_PREVIEW_CHARS: usize = 100;

/// Run `<program> init <project_name>`.
///
/// Returns `true` on a zero exit status. A missing binary or a failing
/// command is logged at error level and reported as `false`.
pub async fn run_spec_kit_init(program: &str, project_name: &str) -> bool {
    let output = Command::new(program)
        .arg("init")
        .arg(project_name)
        .output()
        .await;

    match output {
        Ok(out) if out.status.success() => {
            tracing::info!(
                "Spec-Kit initialized: {}",
                String::from_utf8_lossy(&out.stdout).trim()
            );
            true
        }
        Ok(out) => {
            tracing::error!(
                status = ?out.status.code(),
                "Spec-Kit initialization failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            );
            false
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::error!(
                "{} not found. Install with: uv tool install specify-cli",
                program
            );
            false
        }
        Err(e) => {
            tracing::error!("Spec-Kit initialization failed: {}", e);
            false
        }
    }
}

/// Bootstrap the factory from the seed at `seed_path`.
///
/// Returns `Ok(None)` when the seed file does not exist, so callers can
/// decide how to proceed. Malformed JSON is an error.
pub async fn bootstrap_factory(seed_path: &Path, specify_program: &str) -> Result<Option<Seed>> {
    let seed = match load_seed(seed_path) {
        Ok(seed) => seed,
        Err(SeedError::NotFound(path)) => {
            tracing::error!("Seed file not found: {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Bootstrapping factory for project: {}", seed.project_name());
    tracing::info!("Intent: {}", intent_preview(seed.intent()));

    // Best effort: Spec-Kit is not required for placeholder generation.
    run_spec_kit_init(specify_program, seed.project_name()).await;

    Ok(Some(seed))
}

/// Truncate `intent` to [`INTENT_PREVIEW_CHARS`] characters, marking the cut.
pub fn intent_preview(intent: &str) -> String {
    if intent.chars().count() > INTENT_PREVIEW_CHARS {
        let head: String = intent.chars().take(INTENT_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        intent.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_intent_preview_short() {
        assert_eq!(intent_preview("short intent"), "short intent");
    }

    #[test]
    fn test_intent_preview_truncates() {
        let long = "é".repeat(150);
        let preview = intent_preview(&long);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 103);
    }

    #[tokio::test]
    async fn test_missing_cli_reports_false() {
        assert!(!run_spec_kit_init("definitely-not-a-real-specify-binary", "demo").await);
    }

    #[tokio::test]
    async fn test_bootstrap_missing_seed_returns_none() {
        let tmp = TempDir::new().unwrap();
        let result = bootstrap_factory(&tmp.path().join("seed.json"), "definitely-not-a-real-specify-binary")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_invalid_seed_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seed.json");
        std::fs::write(&path, "not valid json {{{").unwrap();
        assert!(bootstrap_factory(&path, "definitely-not-a-real-specify-binary")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_bootstrap_continues_without_cli() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seed.json");
        std::fs::write(&path, r#"{"project_metadata": {"name": "demo"}}"#).unwrap();
        let seed = bootstrap_factory(&path, "definitely-not-a-real-specify-binary")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(seed.project_name(), "demo");
    }
}
