//! The knowledge base: single point of mutation for the vector index and
//! the retrieval chain derived from it.
//!
//! Lifecycle: empty at process start → populated after the first successful
//! ingestion → empty again after reset. The chain always reflects the index
//! as of the most recent completed ingestion; readers never observe a chain
//! paired with an index state it was not built from.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::core::config::{AppConfig, LlmSettings, RagSettings};
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;

use super::chain::RetrievalChain;
use super::sources::IngestSource;
use super::splitter::TextSplitter;
use super::sqlite::SqliteVectorStore;
use super::store::{ChunkRecord, VectorStore};

/// Summary of one successful ingestion.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub source: String,
    pub chunks_added: usize,
}

/// The (index handle, chain) pair. Both are set together under the write
/// lock, so the pair is always from the same completed ingestion.
#[derive(Default)]
struct IndexState {
    store: Option<Arc<SqliteVectorStore>>,
    chain: Option<Arc<RetrievalChain>>,
}

pub struct KnowledgeBase {
    index_dir: PathBuf,
    rag: RagSettings,
    llm_settings: LlmSettings,
    llm: Arc<dyn LlmProvider>,
    state: RwLock<IndexState>,
    /// Serializes ingest and reset against each other. Chat requests only
    /// take the state read lock and are never blocked by slow adapter,
    /// embedding or model calls happening inside a writer.
    writer: Mutex<()>,
}

impl KnowledgeBase {
    pub fn new(index_dir: PathBuf, config: &AppConfig, llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            index_dir,
            rag: config.rag.clone(),
            llm_settings: config.llm.clone(),
            llm,
            state: RwLock::new(IndexState::default()),
            writer: Mutex::new(()),
        }
    }

    /// Ingest one source: load, tag, chunk, embed, append to the index,
    /// then rebuild and swap in a fresh retrieval chain.
    ///
    /// Ingestion is additive; re-ingesting the same document stores its
    /// chunks twice. Any failure leaves the previous index contents and the
    /// previous chain untouched.
    pub async fn ingest(&self, source: IngestSource) -> Result<IngestReport, ApiError> {
        let _writer = self.writer.lock().await;

        let label = source.label();
        tracing::info!("Ingesting source: {}", label);

        // Adapters fail before emitting anything, so a parse error here has
        // written nothing.
        let records = source.load().await?;

        let chunks = self.build_chunks(records, &label, source.splits_text());
        if chunks.is_empty() {
            return Err(ApiError::Ingestion(format!(
                "source '{label}' produced no chunks"
            )));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self
            .llm
            .embed(&texts)
            .await
            .map_err(|e| ApiError::Ingestion(e.to_string()))?;
        if embeddings.len() != chunks.len() {
            return Err(ApiError::Ingestion(format!(
                "embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        // Append to the existing index, or create it on first ingestion.
        let store = match self.state.read().await.store.clone() {
            Some(store) => store,
            None => Arc::new(SqliteVectorStore::open(&self.index_dir).await?),
        };

        let chunks_added = chunks.len();
        store
            .insert_batch(chunks.into_iter().zip(embeddings).collect())
            .await?;

        let chain = Arc::new(RetrievalChain::new(
            store.clone(),
            self.llm.clone(),
            &self.rag,
            &self.llm_settings,
        ));

        // Swap the pair atomically with respect to readers.
        {
            let mut state = self.state.write().await;
            state.store = Some(store);
            state.chain = Some(chain);
        }

        tracing::info!("Ingested {} chunks from {}", chunks_added, label);
        Ok(IngestReport {
            source: label,
            chunks_added,
        })
    }

    /// Destroy the on-disk index and return to the empty state. Idempotent:
    /// resetting an already-empty knowledge base succeeds.
    pub async fn reset(&self) -> Result<(), ApiError> {
        let _writer = self.writer.lock().await;

        {
            let mut state = self.state.write().await;
            if let Some(store) = state.store.take() {
                store.close().await;
            }
            state.chain = None;
        }

        match std::fs::remove_dir_all(&self.index_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ApiError::Storage(format!(
                    "cannot delete index at {}: {e}",
                    self.index_dir.display()
                )))
            }
        }

        std::fs::create_dir_all(&self.index_dir).map_err(|e| {
            ApiError::Storage(format!(
                "cannot recreate index at {}: {e}",
                self.index_dir.display()
            ))
        })?;

        tracing::info!("Knowledge base reset");
        Ok(())
    }

    /// The current retrieval chain, or `None` before the first successful
    /// ingestion (and after reset).
    pub async fn current_chain(&self) -> Option<Arc<RetrievalChain>> {
        self.state.read().await.chain.clone()
    }

    /// Total chunks in the index. Zero when no index exists.
    pub async fn chunk_count(&self) -> Result<usize, ApiError> {
        match self.state.read().await.store.clone() {
            Some(store) => store.count().await,
            None => Ok(0),
        }
    }

    /// Tag records with the source identifier and apply the chunking
    /// policy. CSV rows stay whole; document and website text is split.
    fn build_chunks(
        &self,
        records: Vec<super::sources::SourceRecord>,
        label: &str,
        split: bool,
    ) -> Vec<ChunkRecord> {
        let splitter = TextSplitter::new(self.rag.chunk_size, self.rag.chunk_overlap);
        let mut chunks = Vec::new();

        for record in records {
            let mut metadata = record.metadata;
            metadata.insert("source".to_string(), label.to_string());

            if split {
                for piece in splitter.split(&record.text) {
                    chunks.push(ChunkRecord {
                        chunk_id: uuid::Uuid::new_v4().to_string(),
                        content: piece,
                        metadata: metadata.clone(),
                    });
                }
            } else if !record.text.trim().is_empty() {
                chunks.push(ChunkRecord {
                    chunk_id: uuid::Uuid::new_v4().to_string(),
                    content: record.text,
                    metadata,
                });
            }
        }

        chunks
    }
}
