//! Resume providers: one adapter per inference backend plus the offline
//! extractor, all behind the `ResumeProvider` trait.
//!
//! Adapters never return `Err`. Transport, status and decoding problems come
//! back as `ProviderResult::Failed` so the orchestrator can record them and
//! move on to the next provider.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::models::provider::{ProviderKind, ProviderResult};

pub mod gemini;
pub mod huggingface;
pub mod normalize;
pub mod offline;
pub mod ollama;
pub mod openai;
pub mod prompts;

pub use gemini::GeminiProvider;
pub use huggingface::HuggingFaceProvider;
pub use offline::OfflineProvider;
pub use ollama::{OllamaClient, OllamaProvider};
pub use openai::OpenAiProvider;

/// Per-request knobs passed through to the provider.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Preferred local model. Ignored by remote providers.
    pub model: Option<String>,
}

/// A backend that can turn resume text into a `ProviderResult`.
///
/// Carried in the registry as `Arc<dyn ResumeProvider>`.
#[async_trait]
pub trait ResumeProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Capability check for status reporting: a key is configured, or the
    /// local server has models. `parse` makes the same check itself and
    /// reports `FailureKind::Unavailable`.
    async fn is_available(&self) -> bool;

    /// One attempt. Failures are returned as `ProviderResult::Failed`.
    async fn parse(&self, text: &str, options: &ParseOptions) -> ProviderResult;
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub provider: ProviderKind,
    pub display_name: &'static str,
    pub available: bool,
}

/// Every provider the service knows, built once at startup.
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn ResumeProvider>>,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<Arc<dyn ResumeProvider>>) -> Self {
        Self { providers }
    }

    pub fn from_config(config: &Config, llm: &LlmClient) -> Self {
        let ollama = OllamaClient::new(llm.clone(), &config.ollama_base_url);
        Self::new(vec![
            Arc::new(OpenAiProvider::new(llm.clone(), config.openai.clone())),
            Arc::new(GeminiProvider::new(llm.clone(), config.gemini.clone())),
            Arc::new(HuggingFaceProvider::new(llm.clone(), config.huggingface.clone())),
            Arc::new(OllamaProvider::new(ollama)),
            Arc::new(OfflineProvider),
        ])
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn ResumeProvider>> {
        self.providers.iter().find(|p| p.kind() == kind).cloned()
    }

    /// Resolves `order` to registered providers, skipping unknown kinds.
    pub fn chain(&self, order: &[ProviderKind]) -> Vec<Arc<dyn ResumeProvider>> {
        order.iter().filter_map(|kind| self.get(*kind)).collect()
    }

    /// Runs every capability check concurrently.
    pub async fn statuses(&self) -> Vec<ProviderStatus> {
        let checks = self.providers.iter().map(|p| async move {
            ProviderStatus {
                provider: p.kind(),
                display_name: p.kind().display_name(),
                available: p.is_available().await,
            }
        });
        futures::future::join_all(checks).await
    }
}
