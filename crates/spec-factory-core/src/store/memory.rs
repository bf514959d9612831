//! In-memory [`Store`] implementation.
//!
//! Collections are kept in a `BTreeMap` behind `std::sync::RwLock`, each
//! holding its records in a `HashMap` keyed by id. Contents are lost when
//! the store is dropped. A collection's dimensionality is fixed by the
//! first vector written to it.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::models::{ChunkRecord, CollectionInfo, RetrievedChunk};

use super::{rank, Store};

struct StoredRecord {
    record: ChunkRecord,
    vector: Vec<f32>,
}

struct StoredCollection {
    metadata: serde_json::Value,
    dims: Option<usize>,
    records: HashMap<String, StoredRecord>,
}

/// Ephemeral store keyed by collection name.
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<BTreeMap<String, StoredCollection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_or_create_collection(
        &self,
        name: &str,
        metadata: &serde_json::Value,
    ) -> Result<CollectionInfo> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        let coll = collections
            .entry(name.to_string())
            .or_insert_with(|| StoredCollection {
                metadata: metadata.clone(),
                dims: None,
                records: HashMap::new(),
            });
        Ok(CollectionInfo {
            name: name.to_string(),
            metadata: coll.metadata.clone(),
            count: coll.records.len(),
        })
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections
            .iter()
            .map(|(name, c)| CollectionInfo {
                name: name.clone(),
                metadata: c.metadata.clone(),
                count: c.records.len(),
            })
            .collect())
    }

    async fn upsert(
        &self,
        collection: &str,
        records: &[ChunkRecord],
        vectors: &[Vec<f32>],
    ) -> Result<()> {
        if records.len() != vectors.len() {
            bail!(
                "upsert: {} records but {} vectors",
                records.len(),
                vectors.len()
            );
        }
        let mut collections = self.collections.write().map_err(poisoned)?;
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| anyhow!("collection does not exist: {}", collection))?;
        if let Some(dims) = coll.dims.or_else(|| vectors.first().map(Vec::len)) {
            if let Some(bad) = vectors.iter().find(|v| v.len() != dims) {
                bail!(
                    "collection '{}' holds {}-dimensional vectors, got {}",
                    collection,
                    dims,
                    bad.len()
                );
            }
            coll.dims = Some(dims);
        }
        for (record, vector) in records.iter().zip(vectors) {
            coll.records.insert(
                record.id.clone(),
                StoredRecord {
                    record: record.clone(),
                    vector: vector.clone(),
                },
            );
        }
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().map_err(poisoned)?;
        collections
            .get(collection)
            .map(|c| c.records.len())
            .ok_or_else(|| anyhow!("collection does not exist: {}", collection))
    }

    async fn nearest(
        &self,
        collection: &str,
        query_vec: &[f32],
        k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let collections = self.collections.read().map_err(poisoned)?;
        let coll = collections
            .get(collection)
            .ok_or_else(|| anyhow!("collection does not exist: {}", collection))?;
        if let Some(dims) = coll.dims.filter(|d| *d != query_vec.len()) {
            bail!(
                "collection '{}' holds {}-dimensional vectors, query has {}",
                collection,
                dims,
                query_vec.len()
            );
        }
        let candidates = coll
            .records
            .values()
            .map(|sr| RetrievedChunk {
                id: sr.record.id.clone(),
                document: sr.record.document.clone(),
                metadata: sr.record.metadata.clone(),
                score: cosine_similarity(query_vec, &sr.vector),
            })
            .collect();
        Ok(rank(candidates, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::records_for_document;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = InMemoryStore::new();
        let a = store
            .get_or_create_collection("same_name", &json!({"v": 1}))
            .await
            .unwrap();
        let b = store
            .get_or_create_collection("same_name", &json!({"v": 2}))
            .await
            .unwrap();
        assert_eq!(a.name, b.name);
        assert_eq!(b.metadata, json!({"v": 1}));
        assert_eq!(store.list_collections().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_same_id() {
        let store = InMemoryStore::new();
        store.get_or_create_collection("c", &json!({})).await.unwrap();
        let first = records_for_document("doc", "doc.md", ["old"]);
        let second = records_for_document("doc", "doc.md", ["new"]);
        store.upsert("c", &first, &[vec![1.0, 0.0]]).await.unwrap();
        store.upsert("c", &second, &[vec![1.0, 0.0]]).await.unwrap();
        assert_eq!(store.count("c").await.unwrap(), 1);
        let hits = store.nearest("c", &[1.0, 0.0], 5).await.unwrap();
        assert_eq!(hits[0].document, "new");
    }

    #[tokio::test]
    async fn test_nearest_ranks_by_similarity() {
        let store = InMemoryStore::new();
        store.get_or_create_collection("c", &json!({})).await.unwrap();
        let records = records_for_document("d", "d.md", ["x", "y", "z"]);
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]];
        store.upsert("c", &records, &vectors).await.unwrap();

        let hits = store.nearest("c", &[0.0, 1.0], 2).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["d_1", "d_2"]);
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn test_unknown_collection_errors() {
        let store = InMemoryStore::new();
        assert!(store.count("missing").await.is_err());
        assert!(store.nearest("missing", &[1.0], 1).await.is_err());
    }

    #[tokio::test]
    async fn test_mismatched_vectors_rejected() {
        let store = InMemoryStore::new();
        store.get_or_create_collection("c", &json!({})).await.unwrap();
        let records = records_for_document("d", "d.md", ["x", "y"]);
        assert!(store.upsert("c", &records, &[vec![1.0]]).await.is_err());
        assert_eq!(store.count("c").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let store = InMemoryStore::new();
        store.get_or_create_collection("c", &json!({})).await.unwrap();
        let records = records_for_document("d", "d.md", ["x"]);
        store.upsert("c", &records, &[vec![1.0, 0.0, 0.0]]).await.unwrap();

        let err = store.nearest("c", &[1.0, 0.0], 1).await.unwrap_err();
        assert!(err.to_string().contains("3-dimensional"), "{}", err);

        let other = records_for_document("e", "e.md", ["y"]);
        assert!(store.upsert("c", &other, &[vec![1.0]]).await.is_err());
        let mixed = records_for_document("f", "f.md", ["a", "b"]);
        assert!(store
            .upsert("c", &mixed, &[vec![1.0, 0.0, 0.0], vec![1.0]])
            .await
            .is_err());
        assert_eq!(store.count("c").await.unwrap(), 1);
    }
}
