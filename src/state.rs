use std::sync::Arc;

use crate::core::config::{AppConfig, AppPaths};
use crate::llm::{LlmProvider, OllamaProvider};
use crate::rag::KnowledgeBase;

#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: AppConfig,
    pub llm: Arc<dyn LlmProvider>,
    pub knowledge: Arc<KnowledgeBase>,
}

impl AppState {
    pub fn initialize() -> anyhow::Result<Arc<Self>> {
        let paths = Arc::new(AppPaths::new());
        let config = AppConfig::load(&paths)?;
        let llm: Arc<dyn LlmProvider> = Arc::new(OllamaProvider::new(&config.llm));
        let knowledge = Arc::new(KnowledgeBase::new(
            paths.index_dir.clone(),
            &config,
            llm.clone(),
        ));

        Ok(Arc::new(AppState {
            paths,
            config,
            llm,
            knowledge,
        }))
    }
}
