//! Context string construction for agent prompts.

use anyhow::{Context, Result};
use std::path::Path;

use spec_factory_core::context::assemble_context;

use crate::memory::Collection;

/// Build the prompt context for `query`.
///
/// Includes the global context document when `global_context_path` names
/// an existing file (a missing file is skipped, not an error), followed by
/// the `n_results` chunks of `collection` most relevant to `query`.
pub async fn build_context_string(
    collection: &Collection,
    query: &str,
    global_context_path: Option<&Path>,
    n_results: usize,
) -> Result<String> {
    let global = match global_context_path {
        Some(path) if path.exists() => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read global context: {}", path.display()))?,
        ),
        Some(path) => {
            tracing::debug!(path = %path.display(), "global context not found");
            None
        }
        None => None,
    };

    let chunks = collection.retrieve(query, n_results).await?;
    Ok(assemble_context(global.as_deref(), &chunks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::create_store;
    use spec_factory_core::embedding::HashingEmbedder;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_context_with_global_and_chunks() {
        let tmp = TempDir::new().unwrap();
        let agents = tmp.path().join("AGENTS.md");
        std::fs::write(&agents, "# Global Rules\n\nFollow the style guide.").unwrap();
        let spec = tmp.path().join("spec.md");
        std::fs::write(&spec, "## Database\nUse sqlite.\n").unwrap();

        let store = create_store(None, Arc::new(HashingEmbedder::default()))
            .await
            .unwrap();
        let coll = store.get_or_create_collection("c").await.unwrap();
        coll.index_document(&spec, true).await.unwrap();

        let ctx = build_context_string(&coll, "database", Some(&agents), 3)
            .await
            .unwrap();
        assert!(ctx.starts_with("# Global Context (AGENTS.md)\n# Global Rules"));
        assert!(ctx.contains("# Relevant Specification Context\n"));
        assert!(ctx.contains(&format!("## From: {}\n## Database\nUse sqlite.\n", spec.display())));
    }

    #[tokio::test]
    async fn test_missing_global_and_empty_collection() {
        let tmp = TempDir::new().unwrap();
        let store = create_store(None, Arc::new(HashingEmbedder::default()))
            .await
            .unwrap();
        let coll = store.get_or_create_collection("empty").await.unwrap();
        let ctx = build_context_string(&coll, "anything", Some(&tmp.path().join("AGENTS.md")), 3)
            .await
            .unwrap();
        assert_eq!(ctx, "");
    }
}
