use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn health(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Readiness and index size. `ready` is false until the first successful
/// ingestion and after every reset.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let ready = state.knowledge.current_chain().await.is_some();
    let chunk_count = state.knowledge.chunk_count().await.unwrap_or(0);
    let llm_reachable = state.llm.health_check().await.unwrap_or(false);

    Ok(Json(json!({
        "ready": ready,
        "chunk_count": chunk_count,
        "llm_provider": state.llm.name(),
        "llm_reachable": llm_reachable,
    })))
}
