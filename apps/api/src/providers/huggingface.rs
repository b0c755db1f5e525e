use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::prompts::HUGGINGFACE_PARSE_PROMPT_TEMPLATE;
use super::{ParseOptions, ResumeProvider};
use crate::config::HuggingFaceConfig;
use crate::extraction::patterns::{
    find_email, find_phone, guess_name, match_skills, MODEL_TEXT_NAME_RULE, MODEL_TEXT_SKILLS,
};
use crate::llm_client::{truncate, LlmClient, LlmError};
use crate::models::provider::{FailureKind, ProviderKind, ProviderResult};
use crate::models::resume::{Provenance, StructuredResume, MODEL_HEURISTIC_METHOD};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Only the head of the resume is sent; free inference endpoints have small contexts.
const PROMPT_CHARS: usize = 1000;
const MAX_SKILLS: usize = 10;
const ANALYSIS_CHARS: usize = 200;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: Option<String>,
}

/// HuggingFace hosted inference. The models answer in free text, so the
/// record is mined locally from the resume plus the generated text.
pub struct HuggingFaceProvider {
    llm: LlmClient,
    config: HuggingFaceConfig,
}

impl HuggingFaceProvider {
    pub fn new(llm: LlmClient, config: HuggingFaceConfig) -> Self {
        Self { llm, config }
    }

    async fn generate(&self, api_key: &str, model: &str, prompt: &str) -> Result<String, LlmError> {
        let body = InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters {
                max_new_tokens: 300,
                temperature: 0.1,
            },
        };
        let request = self
            .llm
            .post(&format!("{}/{}", self.config.base_url, model))
            .bearer_auth(api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&body);

        let generations: Vec<Generation> = self.llm.send_json(request).await?;
        generations
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::UnexpectedResponse(format!("Unexpected response format from {model}")))?
            .generated_text
            .ok_or_else(|| LlmError::UnexpectedResponse(format!("No generated_text from {model}")))
    }
}

/// Builds a record from the resume and a model's free-text answer.
fn record_from_generation(resume: &str, generated: &str, model: &str) -> StructuredResume {
    let combined = format!("{resume}\n{generated}");

    let mut provenance = Provenance::new(ProviderKind::HuggingFace, Some(model), MODEL_HEURISTIC_METHOD);
    let head = truncate(generated, ANALYSIS_CHARS);
    provenance.analysis = Some(if head.len() < generated.len() {
        format!("{head}...")
    } else {
        generated.to_string()
    });

    let mut record = StructuredResume::empty(provenance);
    record.email = find_email(&combined);
    record.phone = find_phone(&combined);
    record.skills = match_skills(&combined, MODEL_TEXT_SKILLS, Some(MAX_SKILLS));
    record.name = guess_name(resume, &MODEL_TEXT_NAME_RULE);
    record
}

#[async_trait]
impl ResumeProvider for HuggingFaceProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::HuggingFace
    }

    async fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn parse(&self, text: &str, _options: &ParseOptions) -> ProviderResult {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return ProviderResult::failed(self.kind(), FailureKind::Unavailable, "HUGGINGFACE_API_KEY is not set");
        };

        let prompt = HUGGINGFACE_PARSE_PROMPT_TEMPLATE.replace("{resume_text}", truncate(text, PROMPT_CHARS));

        let mut last_error: Option<LlmError> = None;
        for model in &self.config.models {
            match self.generate(api_key, model, &prompt).await {
                Ok(generated) => {
                    info!("HuggingFace model {} answered", model);
                    return ProviderResult::Parsed(record_from_generation(text, &generated, model));
                }
                Err(e) => {
                    warn!("HuggingFace model {} failed: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => ProviderResult::failed(
                self.kind(),
                e.failure_kind(),
                format!("all HuggingFace models failed, last error: {e}"),
            ),
            None => ProviderResult::failed(self.kind(), FailureKind::Unavailable, "no HuggingFace models configured"),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::providers::test_support::spawn_server;

    const RESUME: &str = "Jane Doe\nBackend engineer\nSkills: Python, Docker";

    /// The first model is "loading", the second answers.
    async fn inference(Path(model): Path<String>, Json(body): Json<Value>) -> impl IntoResponse {
        assert_eq!(body["parameters"]["max_new_tokens"], 300);
        if model.contains("first/") {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"error": "Model first/model is currently loading"})),
            );
        }
        let text = format!("Name: Jane Doe. Email jane@x.com. Knows SQL and git. {}", "x".repeat(300));
        (StatusCode::OK, Json(json!([{"generated_text": text}])))
    }

    fn provider(base_url: String) -> HuggingFaceProvider {
        HuggingFaceProvider::new(
            LlmClient::new().unwrap(),
            HuggingFaceConfig {
                api_key: Some("hf_test".to_string()),
                base_url,
                models: vec!["first/model".to_string(), "second/model".to_string()],
            },
        )
    }

    #[tokio::test]
    async fn test_second_model_answer_is_mined() {
        let base = spawn_server(Router::new().route("/*model", post(inference))).await;
        let result = provider(base).parse(RESUME, &ParseOptions::default()).await;

        let record = match result {
            ProviderResult::Parsed(record) => record,
            other => panic!("expected parsed record, got {other:?}"),
        };
        assert_eq!(record.name.as_deref(), Some("Jane Doe"));
        assert_eq!(record.email.as_deref(), Some("jane@x.com"));
        assert_eq!(record.skills, vec!["Python", "Sql", "Docker", "Git"]);
        assert_eq!(record.provenance.model.as_deref(), Some("second/model"));
        assert_eq!(record.provenance.parsing_method, MODEL_HEURISTIC_METHOD);

        let analysis = record.provenance.analysis.unwrap();
        assert!(analysis.ends_with("..."));
        assert_eq!(analysis.chars().count(), ANALYSIS_CHARS + 3);
    }

    #[tokio::test]
    async fn test_empty_generation_list_fails() {
        let router = Router::new().route("/*model", post(|| async { Json(json!([])) }));
        let base = spawn_server(router).await;
        match provider(base).parse(RESUME, &ParseOptions::default()).await {
            ProviderResult::Failed(f) => assert_eq!(f.kind, FailureKind::Malformed),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_short_generation_kept_whole() {
        let record = record_from_generation(RESUME, "Jane, engineer.", "m");
        assert_eq!(record.provenance.analysis.as_deref(), Some("Jane, engineer."));
        assert_eq!(record.skills, vec!["Python", "Docker"]);
    }

    #[test]
    fn test_skills_capped_at_ten() {
        let text = "python java javascript react node.js sql html css machine learning data science aws docker git";
        let record = record_from_generation(text, "", "m");
        assert_eq!(record.skills.len(), 10);
    }
}
