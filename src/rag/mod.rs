//! Retrieval-augmented generation core.
//!
//! This module provides:
//! - `KnowledgeBase`: owns the vector index and the derived retrieval chain
//! - `RetrievalChain`: history-aware rewrite + retrieve-then-synthesize
//! - Source adapters for PDF, CSV and website ingestion
//! - `SqliteVectorStore`: the on-disk vector index

pub mod chain;
pub mod knowledge;
pub mod prompts;
pub mod sources;
pub mod splitter;
pub mod sqlite;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use chain::{ChatOutcome, ChatTurn, RetrievalChain};
pub use knowledge::{IngestReport, KnowledgeBase};
pub use sources::IngestSource;
pub use store::{ChunkRecord, VectorStore};
