/// LLM Client: the shared HTTP plumbing for every inference provider.
///
/// Adapters own their prompts and request bodies. This module owns the
/// reqwest client, status handling and the policy for turning model text into
/// JSON (fence stripping, embedded-object recovery, raw passthrough).
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::provider::FailureKind;

pub mod prompts;

/// Upper bound for any call that does not set its own timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl LlmError {
    /// Maps the error onto the failure taxonomy reported to callers.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            LlmError::Http(_) => FailureKind::Transport,
            LlmError::Api { .. } => FailureKind::Status,
            LlmError::Parse(_) | LlmError::EmptyContent | LlmError::UnexpectedResponse(_) => {
                FailureKind::Malformed
            }
            LlmError::NotConfigured(_) => FailureKind::Unavailable,
        }
    }
}

/// Error bodies differ per vendor: `{"error": {"message": ..}}` for OpenAI and
/// Gemini, `{"error": ".."}` for HuggingFace and Ollama.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorBody {
    Detailed { message: String },
    Plain(String),
}

/// The single HTTP client shared by all providers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
}

impl LlmClient {
    pub fn new() -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Sends the request and deserializes a successful JSON body.
    /// One attempt only: the orchestrator owns fallback, not this layer.
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, LlmError> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Sends the request and returns the successful response for streaming reads.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, LlmError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Inference API returned {}: {}", status, truncate(&body, 300));
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| match e.error {
                    ApiErrorBody::Detailed { message } => message,
                    ApiErrorBody::Plain(message) => message,
                })
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Inference API call succeeded with {}", status);
        Ok(response)
    }
}

/// How a block of model text was understood.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    /// A JSON object, decoded directly or recovered from surrounding prose.
    Json(Value),
    /// Text that holds no decodable JSON object, kept verbatim (fences removed).
    Raw(String),
}

/// Interprets model text: whole-body JSON first, then the outermost `{...}`
/// block, then raw text.
pub fn interpret_output(text: &str) -> ModelOutput {
    let text = strip_json_fences(text);

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text) {
        return ModelOutput::Json(value);
    }

    if let Some(block) = extract_json_block(text) {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(block) {
            return ModelOutput::Json(value);
        }
    }

    ModelOutput::Raw(text.to_string())
}

/// Returns the slice from the first `{` to the last `}`, if they are ordered.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Cuts `text` to at most `max` characters, on a char boundary.
pub fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
