//! RAG chatbot backend: ingests PDF, CSV and website content into an
//! on-disk vector index and answers questions over HTTP by retrieving the
//! most relevant chunks and grounding a language model on them.

pub mod core;
pub mod llm;
pub mod rag;
pub mod server;
pub mod state;
