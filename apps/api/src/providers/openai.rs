use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::normalize::result_from_model_text;
use super::prompts::OPENAI_PARSE_PROMPT_TEMPLATE;
use super::{ParseOptions, ResumeProvider};
use crate::config::OpenAiConfig;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, MISSING_FIELDS_INSTRUCTION, RESUME_JSON_SCHEMA};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::provider::{FailureKind, ProviderKind, ProviderResult};

const TEMPERATURE: f32 = 0.1;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat completions. Tries each configured model in order
/// and stops at the first one that answers.
pub struct OpenAiProvider {
    llm: LlmClient,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    pub fn new(llm: LlmClient, config: OpenAiConfig) -> Self {
        Self { llm, config }
    }

    async fn complete(&self, api_key: &str, model: &str, prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: JSON_ONLY_SYSTEM,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
        };
        let request = self
            .llm
            .post(&format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .json(&body);

        let response: ChatResponse = self.llm.send_json(request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl ResumeProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn parse(&self, text: &str, _options: &ParseOptions) -> ProviderResult {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return ProviderResult::failed(self.kind(), FailureKind::Unavailable, "OPENAI_API_KEY is not set");
        };

        let prompt = OPENAI_PARSE_PROMPT_TEMPLATE
            .replace("{schema}", RESUME_JSON_SCHEMA)
            .replace("{missing_fields}", MISSING_FIELDS_INSTRUCTION)
            .replace("{resume_text}", text);

        let mut last_error: Option<LlmError> = None;
        for model in &self.config.models {
            match self.complete(api_key, model, &prompt).await {
                Ok(content) => {
                    info!("OpenAI model {} answered", model);
                    return result_from_model_text(self.kind(), model, &content);
                }
                Err(e) => {
                    warn!("OpenAI model {} failed: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => ProviderResult::failed(
                self.kind(),
                e.failure_kind(),
                format!("all OpenAI models failed, last error: {e}"),
            ),
            None => ProviderResult::failed(self.kind(), FailureKind::Unavailable, "no OpenAI models configured"),
        }
    }
}
