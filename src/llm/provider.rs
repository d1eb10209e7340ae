use async_trait::async_trait;

use crate::core::errors::ApiError;

use super::types::ChatRequest;

/// Seam for the language model and embedding services.
///
/// Both are black boxes to the rest of the backend: text in, text or
/// fixed-dimension vectors out. Embeddings are deterministic for a given
/// model version, which is what makes the stored vectors reusable across
/// process restarts.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// provider name (e.g. "ollama")
    fn name(&self) -> &str;

    /// check if the provider is healthy/reachable
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// chat completion (non-streaming)
    async fn chat(&self, request: ChatRequest) -> Result<String, ApiError>;

    /// generate one embedding per input, in input order
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;
}
