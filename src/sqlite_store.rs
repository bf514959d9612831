//! SQLite-backed [`Store`] implementation for persistent memory.
//!
//! The database lives at `<persist_dir>/memory.sqlite`. The file and its
//! parent directories are created on open and the schema is migrated in
//! place, so reopening the same directory sees earlier collections.
//!
//! Vectors are stored as little-endian `f32` BLOBs and ranked with a
//! brute-force cosine scan over the requested collection. Every vector in a
//! collection has the dimensionality of the first one written; upserts and
//! queries of any other length are rejected.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use spec_factory_core::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use spec_factory_core::models::{ChunkMetadata, ChunkRecord, CollectionInfo, RetrievedChunk};
use spec_factory_core::store::{rank, Store};

/// File name of the database inside the persistence directory.
pub const DB_FILE_NAME: &str = "memory.sqlite";

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the store under `persist_dir` and run migrations.
    pub async fn open(persist_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(persist_dir).with_context(|| {
            format!("Failed to create memory directory: {}", persist_dir.display())
        })?;
        let path = persist_dir.join(DB_FILE_NAME);

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        // One connection: every operation is awaited in sequence.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open memory store: {}", path.display()))?;

        let store = Self { pool, path };
        store.migrate().await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS collections (
                name TEXT PRIMARY KEY,
                metadata_json TEXT NOT NULL DEFAULT '{}',
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                document TEXT NOT NULL,
                source TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                embedding BLOB NOT NULL,
                PRIMARY KEY (collection, id),
                FOREIGN KEY (collection) REFERENCES collections(name)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn collection_info(&self, name: &str) -> Result<Option<CollectionInfo>> {
        let row = sqlx::query(
            r#"
            SELECT c.metadata_json AS metadata_json,
                   (SELECT COUNT(*) FROM chunks k WHERE k.collection = c.name) AS n
            FROM collections c WHERE c.name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let metadata_json: String = row.get("metadata_json");
            let n: i64 = row.get("n");
            CollectionInfo {
                name: name.to_string(),
                metadata: serde_json::from_str(&metadata_json).unwrap_or(serde_json::json!({})),
                count: n as usize,
            }
        }))
    }

    async fn require_collection(&self, name: &str) -> Result<()> {
        let exists: bool = sqlx::query_scalar("SELECT COUNT(*) > 0 FROM collections WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            bail!("collection does not exist: {}", name);
        }
        Ok(())
    }

    /// Dimensionality of the vectors already stored in `collection`.
    async fn stored_dims(&self, collection: &str) -> Result<Option<usize>> {
        let bytes: Option<i64> =
            sqlx::query_scalar("SELECT length(embedding) FROM chunks WHERE collection = ? LIMIT 1")
                .bind(collection)
                .fetch_optional(&self.pool)
                .await?;
        Ok(bytes.map(|b| b as usize / 4))
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_or_create_collection(
        &self,
        name: &str,
        metadata: &serde_json::Value,
    ) -> Result<CollectionInfo> {
        sqlx::query(
            "INSERT INTO collections (name, metadata_json, created_at) VALUES (?, ?, ?) ON CONFLICT(name) DO NOTHING",
        )
        .bind(name)
        .bind(metadata.to_string())
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        self.collection_info(name)
            .await?
            .with_context(|| format!("collection vanished after create: {}", name))
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM collections ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            if let Some(info) = self.collection_info(&name).await? {
                out.push(info);
            }
        }
        Ok(out)
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
        self.require_collection(collection).await?;

        let expected = match self.stored_dims(collection).await? {
            Some(dims) => Some(dims),
            None => vectors.first().map(Vec::len),
        };
        if let Some(dims) = expected {
            if let Some(bad) = vectors.iter().find(|v| v.len() != dims) {
                bail!(
                    "collection '{}' holds {}-dimensional vectors, got {}",
                    collection,
                    dims,
                    bad.len()
                );
            }
        }

        let mut tx = self.pool.begin().await?;
        for (record, vector) in records.iter().zip(vectors) {
            sqlx::query(
                r#"
                INSERT INTO chunks (collection, id, document, source, chunk_index, embedding)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(collection, id) DO UPDATE SET
                    document = excluded.document,
                    source = excluded.source,
                    chunk_index = excluded.chunk_index,
                    embedding = excluded.embedding
                "#,
            )
            .bind(collection)
            .bind(&record.id)
            .bind(&record.document)
            .bind(&record.metadata.source)
            .bind(record.metadata.chunk_index as i64)
            .bind(vec_to_blob(vector))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        self.require_collection(collection).await?;
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(n as usize)
    }

    async fn nearest(
        &self,
        collection: &str,
        query_vec: &[f32],
        k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        self.require_collection(collection).await?;
        let rows = sqlx::query(
            "SELECT id, document, source, chunk_index, embedding FROM chunks WHERE collection = ?",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in &rows {
            let blob: Vec<u8> = row.get("embedding");
            let vector = blob_to_vec(&blob);
            if vector.len() != query_vec.len() {
                bail!(
                    "collection '{}' holds {}-dimensional vectors, query has {}",
                    collection,
                    vector.len(),
                    query_vec.len()
                );
            }
            let chunk_index: i64 = row.get("chunk_index");
            candidates.push(RetrievedChunk {
                id: row.get("id"),
                document: row.get("document"),
                metadata: ChunkMetadata {
                    source: row.get("source"),
                    chunk_index: chunk_index as usize,
                },
                score: cosine_similarity(query_vec, &vector),
            });
        }

        Ok(rank(candidates, k))
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
