//! Seed loading and artifact writing.
//!
//! The seed (`.speckit/seed.json`) describes the project to build:
//!
//! ```json
//! {
//!   "project_metadata": { "name": "todo-api", "description": "...", "version": "0.1.0" },
//!   "intent": "A REST API for managing todo items",
//!   "tech_stack": { "language": "python", "framework": "fastapi", "database": "sqlite" }
//! }
//! ```
//!
//! Only well-formedness is checked. Unknown keys are ignored and missing or
//! mistyped keys fall back to defaults through the [`Seed`] accessors.

use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("seed file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Parsed seed configuration. Read-only once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Seed {
    raw: Value,
}

impl Seed {
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    /// The full JSON document.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    fn lookup(&self, section: &str, key: &str) -> Option<&str> {
        self.raw.get(section)?.get(key)?.as_str()
    }

    pub fn project_name(&self) -> &str {
        self.lookup("project_metadata", "name")
            .unwrap_or("unnamed-project")
    }

    pub fn description(&self) -> &str {
        self.lookup("project_metadata", "description").unwrap_or("")
    }

    pub fn version(&self) -> &str {
        self.lookup("project_metadata", "version").unwrap_or("")
    }

    pub fn intent(&self) -> &str {
        self.raw.get("intent").and_then(Value::as_str).unwrap_or("")
    }

    pub fn language(&self) -> &str {
        self.lookup("tech_stack", "language").unwrap_or("python")
    }

    pub fn framework(&self) -> &str {
        self.lookup("tech_stack", "framework").unwrap_or("fastapi")
    }

    pub fn database(&self) -> &str {
        self.lookup("tech_stack", "database").unwrap_or("chromadb")
    }
}

/// Read and parse the seed at `path`.
pub fn load_seed(path: &Path) -> Result<Seed, SeedError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            SeedError::NotFound(path.to_path_buf())
        } else {
            SeedError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let raw = serde_json::from_str(&content).map_err(|e| SeedError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(Seed::from_value(raw))
}

/// Write `content` to `path`, creating missing parent directories.
///
/// Existing files are overwritten in place; the write is not atomic.
pub fn write_artifact(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "Written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_load_valid_seed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seed.json");
        std::fs::write(
            &path,
            json!({
                "project_metadata": {"name": "test-project", "version": "0.1.0"},
                "intent": "Test intent"
            })
            .to_string(),
        )
        .unwrap();

        let seed = load_seed(&path).unwrap();
        assert_eq!(seed.project_name(), "test-project");
        assert_eq!(seed.version(), "0.1.0");
        assert_eq!(seed.intent(), "Test intent");
    }

    #[test]
    fn test_missing_seed_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = load_seed(&tmp.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, SeedError::NotFound(_)), "got {:?}", err);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("invalid.json");
        std::fs::write(&path, "not valid json {{{").unwrap();
        let err = load_seed(&path).unwrap_err();
        assert!(matches!(err, SeedError::Parse { .. }), "got {:?}", err);
    }

    #[test]
    fn test_accessor_defaults() {
        let seed = Seed::from_value(json!({"unknown": true}));
        assert_eq!(seed.project_name(), "unnamed-project");
        assert_eq!(seed.description(), "");
        assert_eq!(seed.intent(), "");
        assert_eq!(seed.language(), "python");
        assert_eq!(seed.framework(), "fastapi");
        assert_eq!(seed.database(), "chromadb");
    }

    #[test]
    fn test_mistyped_keys_fall_back() {
        let seed = Seed::from_value(json!({"project_metadata": "oops", "intent": 42}));
        assert_eq!(seed.project_name(), "unnamed-project");
        assert_eq!(seed.intent(), "");
    }

    #[test]
    fn test_non_object_json_is_accepted() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seed.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let seed = load_seed(&path).unwrap();
        assert_eq!(seed.project_name(), "unnamed-project");
    }

    #[test]
    fn test_write_artifact() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("spec.md");
        write_artifact(&path, "# Test Specification\n\nContent here.").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# Test Specification\n\nContent here."
        );
    }

    #[test]
    fn test_write_artifact_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("path").join("spec.md");
        write_artifact(&path, "# Nested Spec").unwrap();
        assert!(tmp.path().join("nested").join("path").is_dir());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Nested Spec");
    }

    #[test]
    fn test_write_artifact_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("plan.md");
        write_artifact(&path, "first version, longer").unwrap();
        write_artifact(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
