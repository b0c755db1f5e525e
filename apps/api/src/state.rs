use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::providers::{OllamaClient, ProviderRegistry};
use crate::qa::ResumeAssistant;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once at startup; nothing in it changes afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: ProviderRegistry,
    pub ollama: OllamaClient,
    pub assistant: ResumeAssistant,
}

impl AppState {
    pub fn new(config: Config, llm: LlmClient) -> Self {
        let ollama = OllamaClient::new(llm.clone(), &config.ollama_base_url);
        let registry = ProviderRegistry::from_config(&config, &llm);
        let assistant = ResumeAssistant::new(ollama.clone(), config.chunking);
        Self {
            config: Arc::new(config),
            registry,
            ollama,
            assistant,
        }
    }
}
