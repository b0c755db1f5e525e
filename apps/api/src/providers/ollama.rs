//! Local model server (Ollama): model listing, pulls, raw generation and the
//! resume provider built on top of them.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::normalize::result_from_model_text;
use super::prompts::OLLAMA_PARSE_PROMPT_TEMPLATE;
use super::{ParseOptions, ResumeProvider};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::provider::{FailureKind, ProviderKind, ProviderResult};

const TAGS_TIMEOUT: Duration = Duration::from_secs(5);
const PARSE_TIMEOUT: Duration = Duration::from_secs(180);
const PULL_TIMEOUT: Duration = Duration::from_secs(600);

/// Known-good models for resume work, best first.
pub const RECOMMENDED_MODELS: &[&str] = &[
    "llama3.2:3b",
    "llama3.1:8b",
    "llama2:7b",
    "mistral:7b",
    "phi3:mini",
    "gemma2:2b",
];

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Sampling options sent with `/api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    pub num_ctx: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<&'static str>,
}

impl GenerateOptions {
    /// Low temperature and a wide context for structured extraction.
    pub fn extraction() -> Self {
        Self {
            temperature: 0.1,
            top_p: Some(0.9),
            num_ctx: 4096,
            stop: vec!["Human:", "Assistant:"],
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerateOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    name: &'a str,
}

/// One line of the streamed pull progress.
#[derive(Debug, Deserialize)]
struct PullProgress {
    status: Option<String>,
    completed: Option<u64>,
    total: Option<u64>,
    error: Option<String>,
}

/// Final outcome of a model pull.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullOutcome {
    pub model: String,
    /// Last status line reported by the server, `success` when complete.
    pub status: String,
    pub succeeded: bool,
}

#[derive(Clone)]
pub struct OllamaClient {
    llm: LlmClient,
    base_url: String,
}

impl OllamaClient {
    pub fn new(llm: LlmClient, base_url: &str) -> Self {
        Self {
            llm,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let request = self
            .llm
            .get(&format!("{}/api/tags", self.base_url))
            .timeout(TAGS_TIMEOUT);
        let tags: TagsResponse = self.llm.send_json(request).await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// The requested model when installed, otherwise the first installed one.
    pub async fn resolve_model(&self, requested: Option<&str>) -> Result<String, LlmError> {
        let installed = self.list_models().await?;
        if let Some(wanted) = requested {
            if installed.iter().any(|m| m == wanted) {
                return Ok(wanted.to_string());
            }
            debug!("Requested Ollama model {} is not installed", wanted);
        }
        installed
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::NotConfigured("no Ollama models installed".to_string()))
    }

    /// Non-streaming completion; returns the `response` text.
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerateOptions,
        timeout: Duration,
    ) -> Result<String, LlmError> {
        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
            options,
        };
        let request = self
            .llm
            .post(&format!("{}/api/generate", self.base_url))
            .timeout(timeout)
            .json(&body);
        let response: GenerateResponse = self.llm.send_json(request).await?;
        if response.response.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(response.response)
    }

    /// Pulls `name`, logging streamed progress, and reports the final status.
    pub async fn pull_model(&self, name: &str) -> Result<PullOutcome, LlmError> {
        info!("Pulling Ollama model {}", name);
        let request = self
            .llm
            .post(&format!("{}/api/pull", self.base_url))
            .timeout(PULL_TIMEOUT)
            .json(&PullRequest { name });
        let response = self.llm.send(request).await?;

        let mut stream = response.bytes_stream();
        let mut pending: Vec<u8> = Vec::new();
        let mut last_status = String::new();

        while let Some(chunk) = stream.next().await {
            pending.extend_from_slice(&chunk?);
            while let Some(pos) = pending.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = pending.drain(..=pos).collect();
                if let Some(status) = record_progress(name, &line)? {
                    last_status = status;
                }
            }
        }
        if let Some(status) = record_progress(name, &pending)? {
            last_status = status;
        }

        let succeeded = last_status == "success";
        if succeeded {
            info!("Pulled Ollama model {}", name);
        } else {
            warn!("Pull of Ollama model {} ended with status '{}'", name, last_status);
        }
        Ok(PullOutcome {
            model: name.to_string(),
            status: last_status,
            succeeded,
        })
    }
}

/// Logs one progress line and returns its status. Unparseable lines are skipped.
fn record_progress(model: &str, line: &[u8]) -> Result<Option<String>, LlmError> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Ok(progress) = serde_json::from_str::<PullProgress>(line) else {
        debug!("Skipping unparseable pull progress line: {}", line);
        return Ok(None);
    };
    if let Some(error) = progress.error {
        return Err(LlmError::UnexpectedResponse(format!("pull of {model} failed: {error}")));
    }
    if let (Some(completed), Some(total)) = (progress.completed, progress.total) {
        if total > 0 {
            debug!("Pulling {}: {}%", model, completed * 100 / total);
        }
    }
    Ok(progress.status)
}

/// Recommended models that are installed; failing that, the first three installed.
pub fn recommended_models(installed: &[String]) -> Vec<String> {
    let recommended: Vec<String> = RECOMMENDED_MODELS
        .iter()
        .filter(|r| installed.iter().any(|m| m.as_str() == **r))
        .map(|r| r.to_string())
        .collect();
    if recommended.is_empty() {
        installed.iter().take(3).cloned().collect()
    } else {
        recommended
    }
}

pub struct OllamaProvider {
    client: OllamaClient,
}

impl OllamaProvider {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResumeProvider for OllamaProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    async fn is_available(&self) -> bool {
        match self.client.list_models().await {
            Ok(models) => !models.is_empty(),
            Err(e) => {
                debug!("Ollama not reachable: {}", e);
                false
            }
        }
    }

    async fn parse(&self, text: &str, options: &ParseOptions) -> ProviderResult {
        let model = match self.client.resolve_model(options.model.as_deref()).await {
            Ok(model) => model,
            Err(e) => {
                // An unreachable server means the local backend is simply not there.
                let kind = match &e {
                    LlmError::Http(_) | LlmError::NotConfigured(_) => FailureKind::Unavailable,
                    other => other.failure_kind(),
                };
                return ProviderResult::failed(self.kind(), kind, e.to_string());
            }
        };

        let prompt = OLLAMA_PARSE_PROMPT_TEMPLATE.replace("{resume_text}", text);
        info!("Parsing with Ollama model {}", model);
        match self
            .client
            .generate(&model, &prompt, &GenerateOptions::extraction(), PARSE_TIMEOUT)
            .await
        {
            Ok(content) => result_from_model_text(self.kind(), &model, &content),
            Err(e) => {
                warn!("Ollama model {} failed: {}", model, e);
                ProviderResult::failed(self.kind(), e.failure_kind(), e.to_string())
            }
        }
    }
}
