//! Deterministic mock providers shared by chain and knowledge-base tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::errors::ApiError;
use crate::llm::{ChatRequest, LlmProvider};

const EMBED_DIM: usize = 16;

/// Deterministic embedding: a character-class histogram, normalized. Equal
/// texts embed equally; similar texts score higher than unrelated ones.
pub fn deterministic_embedding(text: &str) -> Vec<f32> {
    let mut vec = vec![0.0f32; EMBED_DIM];
    for ch in text.chars() {
        let bucket = (ch as usize) % EMBED_DIM;
        vec[bucket] += 1.0;
    }
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vec {
            *x /= norm;
        }
    }
    vec
}

/// Mock provider with a canned chat answer and deterministic embeddings.
pub struct MockLlm {
    answer: String,
    chat_calls: AtomicUsize,
}

impl MockLlm {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            chat_calls: AtomicUsize::new(0),
        }
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for MockLlm {
    fn name(&self) -> &str {
        "mock"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(true)
    }

    async fn chat(&self, _request: ChatRequest) -> Result<String, ApiError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        Ok(inputs.iter().map(|t| deterministic_embedding(t)).collect())
    }
}

/// Provider that sleeps before every call, for timeout tests.
pub struct SlowLlm {
    pub delay: Duration,
}

#[async_trait]
impl LlmProvider for SlowLlm {
    fn name(&self) -> &str {
        "slow"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(true)
    }

    async fn chat(&self, _request: ChatRequest) -> Result<String, ApiError> {
        tokio::time::sleep(self.delay).await;
        Ok("too late".to_string())
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        tokio::time::sleep(self.delay).await;
        Ok(inputs.iter().map(|t| deterministic_embedding(t)).collect())
    }
}

/// Provider whose chat calls always fail; embeddings still work.
pub struct FailingLlm;

#[async_trait]
impl LlmProvider for FailingLlm {
    fn name(&self) -> &str {
        "failing"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(false)
    }

    async fn chat(&self, _request: ChatRequest) -> Result<String, ApiError> {
        Err(ApiError::Internal("mock model is down".to_string()))
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        Ok(inputs.iter().map(|t| deterministic_embedding(t)).collect())
    }
}
