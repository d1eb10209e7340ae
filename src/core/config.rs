use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Filesystem layout for all persisted state.
///
/// The vector index lives entirely under `index_dir`; deleting that
/// directory and recreating it empty is the complete reset procedure.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub index_dir: PathBuf,
    pub upload_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let data_dir = discover_data_dir();
        let log_dir = data_dir.join("logs");
        let index_dir = data_dir.join("vector_index");
        let upload_dir = data_dir.join("uploads");

        for dir in [&data_dir, &log_dir, &index_dir, &upload_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            data_dir,
            log_dir,
            index_dir,
            upload_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("RAGCHAT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if cfg!(debug_assertions) {
        return env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("data");
    }

    if cfg!(target_os = "windows") {
        let base = env::var("LOCALAPPDATA")
            .unwrap_or_else(|_| env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string()));
        return PathBuf::from(base).join("RagChat");
    }

    if cfg!(target_os = "macos") {
        return home_dir()
            .join("Library")
            .join("Application Support")
            .join("RagChat");
    }

    let xdg = env::var("XDG_DATA_HOME").unwrap_or_else(|_| {
        home_dir()
            .join(".local/share")
            .to_string_lossy()
            .to_string()
    });
    PathBuf::from(xdg).join("ragchat")
}

fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Retrieval and chunking knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Maximum chunk size in characters. Applies to PDF and website text;
    /// CSV rows are always one chunk regardless of length.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters. Larger overlap
    /// improves recall for facts spanning chunk boundaries at the cost of
    /// storing more near-duplicate text.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per query. Larger k improves recall but
    /// grows the prompt and the latency of every chat call.
    pub top_k: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
        }
    }
}

/// Language model / embedding provider settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    /// Upper bound for a single chat-side model call. Expiry fails the
    /// whole chat request; the caller may retry.
    pub request_timeout_secs: u64,
    /// Sampling temperature. None leaves the provider's own default.
    pub temperature: Option<f64>,
    /// Completion length cap. None leaves the provider's own default.
    pub max_tokens: Option<i32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            chat_model: "gemma:2b-instruct-q4_0".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            request_timeout_secs: 120,
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub rag: RagSettings,
    pub llm: LlmSettings,
}

impl AppConfig {
    /// Load `config.toml` from the data dir, falling back to defaults when
    /// the file is absent. A present-but-invalid file is an error rather
    /// than a silent fallback.
    pub fn load(paths: &AppPaths) -> anyhow::Result<Self> {
        Self::load_from(&paths.data_dir.join("config.toml"))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&raw)?;
        Ok(config)
    }
}
