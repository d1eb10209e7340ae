//! The retrieval chain: history-aware query rewriting followed by
//! retrieve-then-synthesize.
//!
//! A chain is built fresh on every successful ingestion, bound to the store
//! handle as of that ingestion. It is immutable once built; the knowledge
//! base swaps the current chain reference instead of mutating it.

use std::sync::Arc;
use std::time::Duration;

use crate::core::config::{LlmSettings, RagSettings};
use crate::core::errors::ApiError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

use super::prompts;
use super::store::{ChunkRecord, VectorStore};

/// One (human, ai) exchange. History is supplied fresh by the caller on
/// every request; the server holds no per-session state.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub human: String,
    pub ai: String,
}

/// The outcome of one chain invocation. `sources` are exactly the chunks
/// handed to the model, in retrieval rank order. This is the retrieval set, not a
/// citation audit.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub answer: String,
    pub sources: Vec<ChunkRecord>,
}

pub struct RetrievalChain {
    store: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmProvider>,
    llm_settings: LlmSettings,
    top_k: usize,
    timeout: Duration,
}

impl RetrievalChain {
    pub fn new(
        store: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmProvider>,
        rag: &RagSettings,
        llm_settings: &LlmSettings,
    ) -> Self {
        Self {
            store,
            llm,
            llm_settings: llm_settings.clone(),
            top_k: rag.top_k,
            timeout: Duration::from_secs(llm_settings.request_timeout_secs),
        }
    }

    /// Answer `query` from the index, using `history` only to resolve
    /// references back into earlier turns.
    pub async fn invoke(
        &self,
        query: &str,
        history: &[ChatTurn],
    ) -> Result<ChatOutcome, ApiError> {
        let standalone = self.standalone_query(query, history).await?;

        // Every leg of the chain runs under the same deadline, so a stalled
        // embedder or store cannot hang the request indefinitely.
        let embeddings = self
            .with_deadline("embedding call", self.llm.embed(std::slice::from_ref(&standalone)))
            .await?;
        let query_embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Generation("no embedding returned for query".to_string()))?;

        let hits = self
            .with_deadline("index search", self.store.search(&query_embedding, self.top_k))
            .await?;

        let context = prompts::render_context(&hits);
        let mut messages = vec![ChatMessage::system(prompts::grounded_answer_prompt(
            &context,
        ))];
        for turn in history {
            messages.push(ChatMessage::user(turn.human.clone()));
            messages.push(ChatMessage::assistant(turn.ai.clone()));
        }
        messages.push(ChatMessage::user(query));

        let request = ChatRequest::new(messages).with_settings(&self.llm_settings);
        let answer = self
            .with_deadline("language model call", self.llm.chat(request))
            .await?;

        Ok(ChatOutcome {
            answer,
            sources: hits.into_iter().map(|hit| hit.chunk).collect(),
        })
    }

    /// Rewrite the query into a standalone question. With empty history the
    /// query passes through unchanged. That is a policy, not an optimization: the
    /// rewriter must never hallucinate context that was never given.
    async fn standalone_query(
        &self,
        query: &str,
        history: &[ChatTurn],
    ) -> Result<String, ApiError> {
        if history.is_empty() {
            return Ok(query.to_string());
        }

        let mut messages = vec![ChatMessage::system(prompts::CONTEXTUALIZE_SYSTEM_PROMPT)];
        for turn in history {
            messages.push(ChatMessage::user(turn.human.clone()));
            messages.push(ChatMessage::assistant(turn.ai.clone()));
        }
        messages.push(ChatMessage::user(query));

        let request = ChatRequest::new(messages).with_settings(&self.llm_settings);
        let rewritten = self
            .with_deadline("language model call", self.llm.chat(request))
            .await?;
        let rewritten = rewritten.trim();

        if rewritten.is_empty() {
            Ok(query.to_string())
        } else {
            Ok(rewritten.to_string())
        }
    }

    /// Run one chain leg under the configured timeout. Failure and expiry
    /// both surface as `Generation`: from the caller's perspective the
    /// answer could not be produced.
    async fn with_deadline<T>(
        &self,
        what: &str,
        fut: impl std::future::Future<Output = Result<T, ApiError>>,
    ) -> Result<T, ApiError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| ApiError::Generation(e.to_string())),
            Err(_) => Err(ApiError::Generation(format!(
                "{} exceeded {}s",
                what,
                self.timeout.as_secs()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::rag::store::ScoredChunk;
    use crate::rag::testutil::{FailingLlm, MockLlm, SlowLlm};

    struct FixedStore {
        hits: Vec<ScoredChunk>,
    }

    #[async_trait::async_trait]
    impl VectorStore for FixedStore {
        async fn insert_batch(
            &self,
            _items: Vec<(ChunkRecord, Vec<f32>)>,
        ) -> Result<(), ApiError> {
            Ok(())
        }

        async fn search(
            &self,
            _query_embedding: &[f32],
            limit: usize,
        ) -> Result<Vec<ScoredChunk>, ApiError> {
            Ok(self.hits.iter().take(limit).cloned().collect())
        }

        async fn count(&self) -> Result<usize, ApiError> {
            Ok(self.hits.len())
        }

        async fn close(&self) {}
    }

    fn fixed_hit(content: &str) -> ScoredChunk {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), "doc.pdf".to_string());
        ScoredChunk {
            chunk: ChunkRecord {
                chunk_id: uuid::Uuid::new_v4().to_string(),
                content: content.to_string(),
                metadata,
            },
            score: 1.0,
        }
    }

    fn chain_with(
        store: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmProvider>,
    ) -> RetrievalChain {
        RetrievalChain::new(
            store,
            llm,
            &RagSettings::default(),
            &LlmSettings::default(),
        )
    }

    #[tokio::test]
    async fn empty_history_passes_query_through_without_a_model_call() {
        // FailingLlm errors on every chat call, so the rewrite step can only
        // succeed by not calling the model at all.
        let chain = chain_with(
            Arc::new(FixedStore { hits: vec![] }),
            Arc::new(FailingLlm),
        );

        let standalone = chain.standalone_query("What is X?", &[]).await.unwrap();
        assert_eq!(standalone, "What is X?");
    }

    #[tokio::test]
    async fn non_empty_history_triggers_a_rewrite() {
        let llm = Arc::new(MockLlm::answering("What is the capital of France?"));
        let chain = chain_with(Arc::new(FixedStore { hits: vec![] }), llm.clone());

        let history = vec![ChatTurn {
            human: "Tell me about France.".to_string(),
            ai: "France is a country in Europe.".to_string(),
        }];
        let standalone = chain
            .standalone_query("What is its capital?", &history)
            .await
            .unwrap();

        assert_eq!(standalone, "What is the capital of France?");
        assert_eq!(llm.chat_calls(), 1);
    }

    #[tokio::test]
    async fn invoke_returns_answer_and_the_full_retrieval_set() {
        let store = FixedStore {
            hits: vec![fixed_hit("Paris is the capital."), fixed_hit("France is big.")],
        };
        let chain = chain_with(Arc::new(store), Arc::new(MockLlm::answering("Paris.")));

        let outcome = chain.invoke("What is the capital?", &[]).await.unwrap();
        assert_eq!(outcome.answer, "Paris.");
        assert_eq!(outcome.sources.len(), 2);
        assert_eq!(outcome.sources[0].content, "Paris is the capital.");
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_embedding_call_fails_instead_of_hanging() {
        let store = FixedStore {
            hits: vec![fixed_hit("Some context.")],
        };
        let settings = LlmSettings {
            request_timeout_secs: 1,
            ..Default::default()
        };
        let chain = RetrievalChain::new(
            Arc::new(store),
            Arc::new(SlowLlm {
                delay: Duration::from_secs(600),
            }),
            &RagSettings::default(),
            &settings,
        );

        let err = chain.invoke("Anything?", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Generation(_)));
    }

    #[tokio::test]
    async fn configured_sampling_knobs_reach_the_model() {
        struct CapturingLlm {
            seen: std::sync::Mutex<Vec<ChatRequest>>,
        }

        #[async_trait::async_trait]
        impl LlmProvider for CapturingLlm {
            fn name(&self) -> &str {
                "capturing"
            }

            async fn health_check(&self) -> Result<bool, ApiError> {
                Ok(true)
            }

            async fn chat(&self, request: ChatRequest) -> Result<String, ApiError> {
                self.seen.lock().unwrap().push(request);
                Ok("ok".to_string())
            }

            async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
                Ok(inputs.iter().map(|_| vec![1.0f32]).collect())
            }
        }

        let llm = Arc::new(CapturingLlm {
            seen: std::sync::Mutex::new(Vec::new()),
        });
        let settings = LlmSettings {
            temperature: Some(0.3),
            max_tokens: Some(128),
            ..Default::default()
        };
        let chain = RetrievalChain::new(
            Arc::new(FixedStore { hits: vec![] }),
            llm.clone(),
            &RagSettings::default(),
            &settings,
        );

        chain.invoke("Question?", &[]).await.unwrap();

        let seen = llm.seen.lock().unwrap();
        assert!(!seen.is_empty());
        for request in seen.iter() {
            assert_eq!(request.temperature, Some(0.3));
            assert_eq!(request.max_tokens, Some(128));
        }
    }

    #[tokio::test]
    async fn model_failure_is_a_generation_error() {
        let store = FixedStore {
            hits: vec![fixed_hit("Some context.")],
        };
        let chain = chain_with(Arc::new(store), Arc::new(FailingLlm));

        let err = chain.invoke("Anything?", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Generation(_)));
    }
}
