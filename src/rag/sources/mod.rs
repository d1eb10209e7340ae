//! Source adapters: PDF, CSV and website ingestion.
//!
//! Each adapter converts one source into an ordered sequence of
//! `SourceRecord`s, or fails with `SourceUnavailable` before emitting
//! anything; partial loads are never returned.

mod csv_file;
mod pdf;
mod web;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::errors::ApiError;

/// A normalized (text, metadata) record produced by an adapter, before
/// chunking and embedding.
#[derive(Debug, Clone)]
pub struct SourceRecord {
    pub text: String,
    pub metadata: HashMap<String, String>,
}

impl SourceRecord {
    pub fn new(text: String) -> Self {
        Self {
            text,
            metadata: HashMap::new(),
        }
    }
}

/// One ingestable source and the adapter that handles it.
#[derive(Debug, Clone)]
pub enum IngestSource {
    Pdf(PathBuf),
    Csv(PathBuf),
    Website(String),
}

impl IngestSource {
    /// Pick the adapter for an uploaded file by extension.
    pub fn from_upload(path: PathBuf) -> Result<Self, ApiError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(IngestSource::Pdf(path)),
            "csv" => Ok(IngestSource::Csv(path)),
            other => Err(ApiError::BadRequest(format!(
                "Unsupported file type '.{other}'. Only .pdf and .csv files are allowed."
            ))),
        }
    }

    /// Source identifier stored in every chunk's metadata: the file name
    /// for uploads, the URL for websites.
    pub fn label(&self) -> String {
        match self {
            IngestSource::Pdf(path) | IngestSource::Csv(path) => file_name(path),
            IngestSource::Website(url) => url.clone(),
        }
    }

    /// Whether the chunking policy applies. CSV rows are always exactly one
    /// chunk, even when longer than the chunk size.
    pub fn splits_text(&self) -> bool {
        !matches!(self, IngestSource::Csv(_))
    }

    /// Load the full record sequence for this source.
    pub async fn load(&self) -> Result<Vec<SourceRecord>, ApiError> {
        match self {
            IngestSource::Pdf(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || pdf::load(&path))
                    .await
                    .map_err(ApiError::internal)?
            }
            IngestSource::Csv(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || csv_file::load(&path))
                    .await
                    .map_err(ApiError::internal)?
            }
            IngestSource::Website(url) => web::load(url).await,
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
