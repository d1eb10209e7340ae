//! VectorStore trait: abstract interface for the vector index.
//!
//! The index is a single named collection of chunks with embeddings:
//! append-only inserts, top-k cosine similarity search, no update-in-place
//! and no per-chunk delete. The only removal mechanism is destroying the
//! whole on-disk index (see `KnowledgeBase::reset`).

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

/// A stored chunk: the retrieval granularity.
///
/// `metadata` is an open string map, genuinely dynamic per source (CSV rows
/// carry their columns, PDFs a page number). It always includes `source`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Unique chunk identifier.
    pub chunk_id: String,
    /// The text content of the chunk.
    pub content: String,
    /// Open metadata map; always contains a "source" key.
    pub metadata: HashMap<String, String>,
}

impl ChunkRecord {
    pub fn source(&self) -> &str {
        self.metadata.get("source").map(String::as_str).unwrap_or("")
    }
}

/// Result of a similarity search.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: ChunkRecord,
    /// Cosine similarity (higher = better).
    pub score: f32,
}

/// Abstract trait for the vector index backend.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert chunks with their embeddings. All-or-nothing: a failure
    /// mid-batch must not leave a partial write behind.
    async fn insert_batch(
        &self,
        items: Vec<(ChunkRecord, Vec<f32>)>,
    ) -> Result<(), ApiError>;

    /// Return the `limit` chunks most similar to the query embedding,
    /// most similar first.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, ApiError>;

    /// Total number of stored chunks.
    async fn count(&self) -> Result<usize, ApiError>;

    /// Release the underlying storage handle so the on-disk index can be
    /// deleted out from under it.
    async fn close(&self);
}
