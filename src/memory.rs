//! Memory store adapter for retrieval-augmented generation.
//!
//! Wraps a [`Store`] backend and an [`Embedder`] behind the small surface the
//! pipeline uses: open a named collection, index a markdown document into
//! it, and retrieve the chunks most similar to a query.
//!
//! ```text
//! create_store(persist_dir?) ──► MemoryStore
//!        │                           │ get_or_create_collection(name)
//!        │                           ▼
//!   InMemoryStore / SqliteStore   Collection ── index_document(path)
//!                                              └─ retrieve(query, k)
//! ```
//!
//! The store is an explicit value owned by the caller and released with
//! [`MemoryStore::close`]. Backend errors are passed through unchanged.
//!
//! A collection records the embedding model and dimensionality it was
//! created with. Opening it with a different embedder is an error, since
//! vectors from two models cannot be compared.

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

use spec_factory_core::chunk::split_document;
use spec_factory_core::embedding::Embedder;
use spec_factory_core::models::{records_for_document, CollectionInfo, RetrievedChunk};
use spec_factory_core::store::memory::InMemoryStore;
use spec_factory_core::store::Store;

use crate::sqlite_store::SqliteStore;

/// Collection used when none is configured.
pub const DEFAULT_COLLECTION: &str = "spec_chunks";

/// Number of chunks retrieved when none is requested.
pub const DEFAULT_N_RESULTS: usize = 3;

const COLLECTION_DESCRIPTION: &str = "Spec-Kit document chunks for RAG";

/// Handle to an opened memory backend.
pub struct MemoryStore {
    store: Arc<dyn Store>,
    embedder: Arc<dyn Embedder>,
}

/// Create the memory store.
///
/// `None` keeps everything in process memory. `Some(dir)` opens (or
/// creates) a SQLite database under `dir` that survives restarts.
pub async fn create_store(
    persist_dir: Option<&Path>,
    embedder: Arc<dyn Embedder>,
) -> Result<MemoryStore> {
    let store: Arc<dyn Store> = match persist_dir {
        Some(dir) => {
            let sqlite = SqliteStore::open(dir).await?;
            tracing::debug!(path = %sqlite.path().display(), "opened persistent memory store");
            Arc::new(sqlite)
        }
        None => Arc::new(InMemoryStore::new()),
    };
    Ok(MemoryStore::new(store, embedder))
}

impl MemoryStore {
    pub fn new(store: Arc<dyn Store>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// Open the collection `name`, creating it on first use.
    ///
    /// Calling this twice with the same name yields handles to the same
    /// underlying collection.
    pub async fn get_or_create_collection(&self, name: &str) -> Result<Collection> {
        let metadata = json!({
            "description": COLLECTION_DESCRIPTION,
            "embedding_model": self.embedder.model_name(),
            "embedding_dims": self.embedder.dims(),
        });
        let info = self
            .store
            .get_or_create_collection(name, &metadata)
            .await
            .with_context(|| format!("Failed to open collection: {}", name))?;
        check_embedder(&info, self.embedder.as_ref())?;
        tracing::debug!(collection = %info.name, count = info.count, "collection ready");

        Ok(Collection {
            name: info.name,
            store: Arc::clone(&self.store),
            embedder: Arc::clone(&self.embedder),
        })
    }

    pub async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        self.store.list_collections().await
    }

    /// Release the backend. Further use of open collections is an error
    /// for persistent stores.
    pub async fn close(self) -> Result<()> {
        self.store.close().await
    }
}

/// Fail when `info` was created by an embedder other than `embedder`.
///
/// Collections without recorded model metadata are accepted.
fn check_embedder(info: &CollectionInfo, embedder: &dyn Embedder) -> Result<()> {
    let model = info.metadata.get("embedding_model").and_then(Value::as_str);
    let dims = info.metadata.get("embedding_dims").and_then(Value::as_u64);

    let model_differs = model.is_some_and(|m| m != embedder.model_name());
    let dims_differ = dims.is_some_and(|d| d as usize != embedder.dims());
    if model_differs || dims_differ {
        bail!(
            "Collection '{}' was indexed with embedding model {} ({} dims) but the configured \
             embedder is {} ({} dims); use a new collection or re-index into a fresh persist_dir",
            info.name,
            model.unwrap_or("unknown"),
            dims.map(|d| d.to_string()).unwrap_or_else(|| "?".to_string()),
            embedder.model_name(),
            embedder.dims()
        );
    }
    Ok(())
}

/// A named collection of embedded document chunks.
#[derive(Clone)]
pub struct Collection {
    name: String,
    store: Arc<dyn Store>,
    embedder: Arc<dyn Embedder>,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Split the document at `path` and upsert its chunks.
    ///
    /// Chunk ids are `{file_stem}_{i}`, so re-indexing a document replaces
    /// its earlier chunks. Returns the number of chunks written, or `0`
    /// without touching the collection when the file does not exist.
    pub async fn index_document(&self, path: &Path, chunk_by_headers: bool) -> Result<usize> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "document not found, skipping");
            return Ok(0);
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;
        let chunks = split_document(&text, chunk_by_headers);

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source = path.display().to_string();
        let records = records_for_document(&stem, &source, chunks);

        let texts: Vec<String> = records.iter().map(|r| r.document.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        self.store.upsert(&self.name, &records, &vectors).await?;

        tracing::info!(
            "Indexed {} chunks from {}",
            records.len(),
            path.display()
        );
        Ok(records.len())
    }

    /// Return up to `k` chunks most similar to `query`, best first.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let query_vec = self.embedder.embed_query(query).await?;
        self.store.nearest(&self.name, &query_vec, k).await
    }

    pub async fn count(&self) -> Result<usize> {
        self.store.count(&self.name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spec_factory_core::embedding::HashingEmbedder;
    use tempfile::TempDir;

    fn embedder() -> Arc<dyn Embedder> {
        Arc::new(HashingEmbedder::default())
    }

    const SPEC: &str = "# Spec\n\n## Database\nUse sqlite for storage tables.\n\n## Authentication\nLogin with tokens and passwords.\n";

    #[tokio::test]
    async fn test_index_and_retrieve_in_memory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("spec.md");
        std::fs::write(&path, SPEC).unwrap();

        let store = create_store(None, embedder()).await.unwrap();
        let coll = store.get_or_create_collection(DEFAULT_COLLECTION).await.unwrap();
        assert_eq!(coll.name(), "spec_chunks");

        let n = coll.index_document(&path, true).await.unwrap();
        assert_eq!(n, 3);
        assert_eq!(coll.count().await.unwrap(), 3);

        let hits = coll.retrieve("authentication tokens login", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "spec_2");
        assert!(hits[0].document.starts_with("## Authentication"));
        assert_eq!(hits[0].metadata.source, path.display().to_string());
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_document_indexes_nothing() {
        let tmp = TempDir::new().unwrap();
        let store = create_store(None, embedder()).await.unwrap();
        let coll = store.get_or_create_collection("c").await.unwrap();
        let n = coll
            .index_document(&tmp.path().join("nonexistent.md"), true)
            .await
            .unwrap();
        assert_eq!(n, 0);
        assert_eq!(coll.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_whole_document_when_not_chunking() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("plan.md");
        std::fs::write(&path, SPEC).unwrap();
        let store = create_store(None, embedder()).await.unwrap();
        let coll = store.get_or_create_collection("c").await.unwrap();
        assert_eq!(coll.index_document(&path, false).await.unwrap(), 1);
        let hits = coll.retrieve("anything", 5).await.unwrap();
        assert_eq!(hits[0].id, "plan_0");
        assert_eq!(hits[0].document, SPEC);
    }

    #[tokio::test]
    async fn test_retrieve_caps_at_collection_size() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("spec.md");
        std::fs::write(&path, SPEC).unwrap();
        let store = create_store(None, embedder()).await.unwrap();
        let coll = store.get_or_create_collection("c").await.unwrap();
        coll.index_document(&path, true).await.unwrap();
        assert_eq!(coll.retrieve("storage", 10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_same_name_shares_collection() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.md");
        std::fs::write(&path, "## Phase 1\n- [ ] one\n").unwrap();
        let store = create_store(None, embedder()).await.unwrap();
        let first = store.get_or_create_collection("shared").await.unwrap();
        let second = store.get_or_create_collection("shared").await.unwrap();
        first.index_document(&path, true).await.unwrap();
        assert_eq!(second.count().await.unwrap(), 1);
        assert_eq!(store.list_collections().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reindex_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("spec.md");
        std::fs::write(&path, SPEC).unwrap();
        let store = create_store(None, embedder()).await.unwrap();
        let coll = store.get_or_create_collection("c").await.unwrap();
        coll.index_document(&path, true).await.unwrap();
        coll.index_document(&path, true).await.unwrap();
        assert_eq!(coll.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_persistent_store_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("spec.md");
        std::fs::write(&doc, SPEC).unwrap();
        let persist = tmp.path().join("memory");

        let store = create_store(Some(&persist), embedder()).await.unwrap();
        let coll = store.get_or_create_collection("spec_chunks").await.unwrap();
        coll.index_document(&doc, true).await.unwrap();
        store.close().await.unwrap();

        let store = create_store(Some(&persist), embedder()).await.unwrap();
        let coll = store.get_or_create_collection("spec_chunks").await.unwrap();
        assert_eq!(coll.count().await.unwrap(), 3);
        let hits = coll.retrieve("sqlite storage", 1).await.unwrap();
        assert_eq!(hits[0].id, "spec_1");
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_reopen_with_other_embedder_rejected() {
        let tmp = TempDir::new().unwrap();
        let doc = tmp.path().join("spec.md");
        std::fs::write(&doc, SPEC).unwrap();
        let persist = tmp.path().join("memory");

        let store = create_store(Some(&persist), embedder()).await.unwrap();
        let coll = store.get_or_create_collection("spec_chunks").await.unwrap();
        coll.index_document(&doc, true).await.unwrap();
        store.close().await.unwrap();

        let small: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(32));
        let store = create_store(Some(&persist), small).await.unwrap();
        let err = store
            .get_or_create_collection("spec_chunks")
            .await
            .err()
            .expect("embedder change must be rejected");
        assert!(err.to_string().contains("re-index"), "{}", err);

        // A fresh collection under the new embedder works.
        let fresh = store.get_or_create_collection("spec_chunks_32").await.unwrap();
        assert_eq!(fresh.index_document(&doc, true).await.unwrap(), 3);
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_collection_records_embedder() {
        let store = create_store(None, embedder()).await.unwrap();
        store.get_or_create_collection("c").await.unwrap();
        let info = &store.list_collections().await.unwrap()[0];
        assert_eq!(info.metadata["embedding_model"], "hashing-256");
        assert_eq!(info.metadata["embedding_dims"], 256);
        assert_eq!(info.metadata["description"], COLLECTION_DESCRIPTION);
    }

    #[test]
    fn test_legacy_metadata_accepted() {
        let info = CollectionInfo {
            name: "old".to_string(),
            metadata: json!({"description": "d"}),
            count: 4,
        };
        assert!(check_embedder(&info, &HashingEmbedder::default()).is_ok());
    }
}
