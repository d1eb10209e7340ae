use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::rag::IngestSource;
use crate::state::AppState;

/// `POST /upload`: multipart file upload. `.pdf` and `.csv` are accepted;
/// anything else is a 400. The bytes are staged to a temp file under the
/// data dir, ingested, then removed regardless of outcome.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut file_name: Option<String> = None;
    let mut bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        // Plain text parts carry no filename; skip them and take the first
        // field that does.
        let Some(name) = field.file_name().map(|n| n.to_string()) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
        file_name = Some(name);
        bytes = Some(data.to_vec());
        break;
    }

    let (file_name, bytes) = match (file_name, bytes) {
        (Some(name), Some(bytes)) => (name, bytes),
        _ => return Err(ApiError::BadRequest("no file provided".to_string())),
    };

    // Validate the extension before writing anything to disk.
    IngestSource::from_upload(PathBuf::from(&file_name))?;

    let staged = state
        .paths
        .upload_dir
        .join(format!("{}-{}", uuid::Uuid::new_v4(), file_name));
    tokio::fs::write(&staged, &bytes)
        .await
        .map_err(ApiError::internal)?;

    let source = IngestSource::from_upload(staged.clone())?;
    let result = state.knowledge.ingest(source).await;

    if let Err(e) = tokio::fs::remove_file(&staged).await {
        tracing::warn!("Failed to remove staged upload {}: {}", staged.display(), e);
    }

    let report = result?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("File '{}' ingested successfully.", file_name),
            "chunks_added": report.chunks_added,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct IngestWebsiteRequest {
    pub url: String,
}

/// `POST /ingest-website`: fetch and ingest one URL.
pub async fn ingest_website(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<IngestWebsiteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let url = payload.url.trim().to_string();
    if url.is_empty() {
        return Err(ApiError::BadRequest("url must not be empty".to_string()));
    }

    let report = state
        .knowledge
        .ingest(IngestSource::Website(url.clone()))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("Website '{}' ingested successfully.", url),
            "chunks_added": report.chunks_added,
        })),
    ))
}

/// `POST /reset`: destroy the index and return to the empty state.
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    state.knowledge.reset().await?;
    Ok(Json(json!({ "message": "Knowledge base reset." })))
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::core::config::{AppConfig, AppPaths};
    use crate::llm::LlmProvider;
    use crate::rag::testutil::MockLlm;
    use crate::rag::KnowledgeBase;
    use crate::server::router::router;
    use crate::state::AppState;

    fn test_state(dir: &Path) -> Arc<AppState> {
        let paths = AppPaths {
            data_dir: dir.to_path_buf(),
            log_dir: dir.join("logs"),
            index_dir: dir.join("vector_index"),
            upload_dir: dir.join("uploads"),
        };
        for d in [&paths.log_dir, &paths.index_dir, &paths.upload_dir] {
            std::fs::create_dir_all(d).unwrap();
        }

        let config = AppConfig::default();
        let llm: Arc<dyn LlmProvider> = Arc::new(MockLlm::answering("ok"));
        let knowledge = Arc::new(KnowledgeBase::new(
            paths.index_dir.clone(),
            &config,
            llm.clone(),
        ));

        Arc::new(AppState {
            paths: Arc::new(paths),
            config,
            llm,
            knowledge,
        })
    }

    fn upload_request(body: String, boundary: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn upload_ignores_text_fields_before_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(test_state(dir.path()));

        // A plain text part first, then the actual file part.
        let boundary = "XUPLOADBOUNDARY";
        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"note\"\r\n\r\n\
             just a comment\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"people.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             name,age\r\nAlice,30\r\n\
             --{b}--\r\n",
            b = boundary
        );

        let response = app.oneshot(upload_request(body, boundary)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn upload_without_a_file_part_is_a_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(test_state(dir.path()));

        let boundary = "XUPLOADBOUNDARY";
        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"note\"\r\n\r\n\
             text only\r\n\
             --{b}--\r\n",
            b = boundary
        );

        let response = app.oneshot(upload_request(body, boundary)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
