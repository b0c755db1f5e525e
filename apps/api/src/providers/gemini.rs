use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::normalize::result_from_model_text;
use super::prompts::GEMINI_PARSE_PROMPT_TEMPLATE;
use super::{ParseOptions, ResumeProvider};
use crate::config::GeminiConfig;
use crate::llm_client::prompts::{MISSING_FIELDS_INSTRUCTION, RESUME_JSON_SCHEMA};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::provider::{FailureKind, ProviderKind, ProviderResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

pub struct GeminiProvider {
    llm: LlmClient,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(llm: LlmClient, config: GeminiConfig) -> Self {
        Self { llm, config }
    }

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, LlmError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                max_output_tokens: 2048,
            },
        };
        let url = format!("{}/models/{}:generateContent", self.config.base_url, self.config.model);
        let request = self.llm.post(&url).query(&[("key", api_key)]).json(&body);

        let response: GenerateContentResponse = self.llm.send_json(request).await?;
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::UnexpectedResponse("No response from Gemini API".to_string()))?;

        candidate
            .content
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .filter(|t| !t.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl ResumeProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn parse(&self, text: &str, _options: &ParseOptions) -> ProviderResult {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return ProviderResult::failed(
                self.kind(),
                FailureKind::Unavailable,
                "GOOGLE_GEMINI_API_KEY is not set",
            );
        };

        let prompt = GEMINI_PARSE_PROMPT_TEMPLATE
            .replace("{schema}", RESUME_JSON_SCHEMA)
            .replace("{missing_fields}", MISSING_FIELDS_INSTRUCTION)
            .replace("{resume_text}", text);

        match self.generate(api_key, &prompt).await {
            Ok(content) => {
                info!("Gemini model {} answered", self.config.model);
                result_from_model_text(self.kind(), &self.config.model, &content)
            }
            Err(e) => {
                warn!("Gemini model {} failed: {}", self.config.model, e);
                ProviderResult::failed(self.kind(), e.failure_kind(), e.to_string())
            }
        }
    }
}
