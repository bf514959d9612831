//! Storage abstraction for indexed chunk collections.
//!
//! The [`Store`] trait covers what the memory adapter needs from a
//! document-vector backend: named collections, upserting embedded chunks,
//! and nearest-neighbour lookup. Backends are pluggable (in-memory here,
//! SQLite in the app crate).
//!
//! Search is a brute-force cosine scan over one collection. There is no
//! index structure; collections are expected to hold a handful of
//! specification documents.

pub mod memory;

use std::cmp::Ordering;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ChunkRecord, CollectionInfo, RetrievedChunk};

/// Abstract document-vector backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`get_or_create_collection`](Store::get_or_create_collection) | Open a collection by name, creating it if needed |
/// | [`list_collections`](Store::list_collections) | Enumerate collections |
/// | [`upsert`](Store::upsert) | Insert or overwrite chunk records with their vectors |
/// | [`count`](Store::count) | Number of records in a collection |
/// | [`nearest`](Store::nearest) | Top-k records by cosine similarity |
/// | [`close`](Store::close) | Release backend resources |
#[async_trait]
pub trait Store: Send + Sync {
    /// Open the collection `name`, creating it with `metadata` if absent.
    ///
    /// Idempotent: an existing collection keeps its original metadata.
    async fn get_or_create_collection(
        &self,
        name: &str,
        metadata: &serde_json::Value,
    ) -> Result<CollectionInfo>;

    /// List all collections, ordered by name.
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>>;

    /// Insert or overwrite records. `vectors[i]` belongs to `records[i]`.
    async fn upsert(
        &self,
        collection: &str,
        records: &[ChunkRecord],
        vectors: &[Vec<f32>],
    ) -> Result<()>;

    /// Number of records stored in `collection`.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Return at most `k` records of `collection`, most similar first.
    async fn nearest(
        &self,
        collection: &str,
        query_vec: &[f32],
        k: usize,
    ) -> Result<Vec<RetrievedChunk>>;

    /// Release resources held by the backend.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Sort by score descending, then id ascending, and keep the top `k`.
pub fn rank(mut candidates: Vec<RetrievedChunk>, k: usize) -> Vec<RetrievedChunk> {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    candidates.truncate(k);
    candidates
}
