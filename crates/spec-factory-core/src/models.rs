//! Core data models shared by the chunking, storage, and retrieval layers.

use serde::{Deserialize, Serialize};

/// Metadata attached to every indexed chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Path of the document the chunk came from, as given to the indexer.
    pub source: String,
    /// Position of the chunk within its document, starting at 0.
    pub chunk_index: usize,
}

/// A chunk ready to be written to a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// `{document_stem}_{chunk_index}`.
    pub id: String,
    /// Verbatim chunk text.
    pub document: String,
    pub metadata: ChunkMetadata,
}

/// A chunk returned by a similarity query, most relevant first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
    pub id: String,
    pub document: String,
    pub metadata: ChunkMetadata,
    /// Cosine similarity between the query and the chunk embedding.
    pub score: f32,
}

/// Summary of a named collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    pub metadata: serde_json::Value,
    pub count: usize,
}

/// Build the record id for chunk `index` of the document with `stem`.
pub fn chunk_id(stem: &str, index: usize) -> String {
    format!("{}_{}", stem, index)
}

/// Turn split chunks of one document into records with contiguous indices.
pub fn records_for_document<I, S>(stem: &str, source: &str, chunks: I) -> Vec<ChunkRecord>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, text)| ChunkRecord {
            id: chunk_id(stem, i),
            document: text.into(),
            metadata: ChunkMetadata {
                source: source.to_string(),
                chunk_index: i,
            },
        })
        .collect()
}
