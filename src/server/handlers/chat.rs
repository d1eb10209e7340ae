use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::errors::ApiError;
use crate::rag::ChatTurn;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    pub query: String,
    /// Ordered (human, ai) pairs, oldest first. Supplied fresh on every
    /// request; the server holds no per-session state.
    #[serde(default)]
    pub chat_history: Vec<(String, String)>,
}

#[derive(Debug, Serialize)]
pub struct SourceDocument {
    pub content: String,
    pub metadata: std::collections::HashMap<String, String>,
}

/// `POST /chat`: answer a query against the current retrieval chain.
/// 400 before the first successful ingestion.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    let chain = state
        .knowledge
        .current_chain()
        .await
        .ok_or(ApiError::NotReady)?;

    let history: Vec<ChatTurn> = payload
        .chat_history
        .into_iter()
        .map(|(human, ai)| ChatTurn { human, ai })
        .collect();

    let outcome = chain.invoke(&payload.query, &history).await?;

    let sources: Vec<SourceDocument> = outcome
        .sources
        .into_iter()
        .map(|chunk| SourceDocument {
            content: chunk.content,
            metadata: chunk.metadata,
        })
        .collect();

    Ok(Json(json!({
        "answer": outcome.answer,
        "sources": sources,
    })))
}
