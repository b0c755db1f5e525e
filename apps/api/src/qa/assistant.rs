use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use super::prompts::{ANSWER_PROMPT_TEMPLATE, INSIGHTS_PROMPT_TEMPLATE};
use super::retrieval::{rank_chunks, ScoredChunk};
use crate::chunking::{ChunkConfig, DocumentChunker};
use crate::llm_client::{interpret_output, LlmError, ModelOutput};
use crate::models::chunk::ChunkStrategy;
use crate::providers::ollama::{GenerateOptions, OllamaClient};

const ANSWER_TIMEOUT: Duration = Duration::from_secs(120);
const INSIGHTS_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    pub model: String,
    pub sources: Vec<ScoredChunk>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub model: String,
    pub insights: Map<String, Value>,
}

/// Question answering and insights over a single resume, backed by the local
/// model server.
#[derive(Clone)]
pub struct ResumeAssistant {
    ollama: OllamaClient,
    chunking: ChunkConfig,
}

impl ResumeAssistant {
    pub fn new(ollama: OllamaClient, chunking: ChunkConfig) -> Self {
        Self { ollama, chunking }
    }

    /// Answers `question` from the best-matching section chunks of `text`.
    pub async fn answer(
        &self,
        question: &str,
        text: &str,
        pages: Option<&[String]>,
        model: Option<&str>,
    ) -> Result<Answer, LlmError> {
        let model = self.ollama.resolve_model(model).await?;

        let chunks = DocumentChunker::new(self.chunking).chunk(text, pages, ChunkStrategy::Sections);
        let sources = rank_chunks(question, text, chunks);
        let context = sources
            .iter()
            .map(|s| match s.chunk.page {
                Some(page) => format!("[{} | page {}]\n{}", s.chunk.section, page, s.chunk.content),
                None => format!("[{}]\n{}", s.chunk.section, s.chunk.content),
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = ANSWER_PROMPT_TEMPLATE
            .replace("{context}", &context)
            .replace("{question}", question);
        let options = GenerateOptions {
            temperature: 0.2,
            top_p: Some(0.9),
            num_ctx: 4096,
            stop: Vec::new(),
        };

        info!("Answering question with {} source chunk(s) on {}", sources.len(), model);
        let answer = self.ollama.generate(&model, &prompt, &options, ANSWER_TIMEOUT).await?;

        Ok(Answer {
            question: question.to_string(),
            answer: answer.trim().to_string(),
            model,
            sources,
        })
    }

    /// Asks the local model for a summary of strengths, gaps and fit.
    pub async fn generate_insights(&self, text: &str, model: Option<&str>) -> Result<Insights, LlmError> {
        let model = self.ollama.resolve_model(model).await?;

        let prompt = INSIGHTS_PROMPT_TEMPLATE.replace("{resume_text}", text);
        let options = GenerateOptions {
            temperature: 0.3,
            top_p: None,
            num_ctx: 2048,
            stop: Vec::new(),
        };
        let response = self.ollama.generate(&model, &prompt, &options, INSIGHTS_TIMEOUT).await?;

        match interpret_output(&response) {
            ModelOutput::Json(Value::Object(insights)) => {
                info!("Generated {} insight field(s) with {}", insights.len(), model);
                Ok(Insights { model, insights })
            }
            _ => Err(LlmError::UnexpectedResponse(
                "Could not generate insights: model did not return a JSON object".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::llm_client::LlmClient;
    use crate::providers::test_support::spawn_server;

    type Seen = Arc<Mutex<Vec<Value>>>;

    const RESUME: &str = "Jane Doe\n\
        EDUCATION\n\
        Massachusetts Institute of Technology, Bachelor of Science in Computer Science, 2016. Graduated with honors.\n\
        EXPERIENCE\n\
        Acme Corp, Senior Engineer, 2018 - present. Built Python services and led a team of four engineers.\n\
        SKILLS\n\
        Python, Rust, SQL, Docker, Kubernetes, and a long list of other technologies used daily at work.";

    fn router(seen: Seen, models: Value, response: &'static str) -> Router {
        Router::new()
            .route("/api/tags", get(move || async move { Json(json!({ "models": models })) }))
            .route(
                "/api/generate",
                post(move |State(seen): State<Seen>, Json(body): Json<Value>| async move {
                    seen.lock().unwrap().push(body);
                    Json(json!({ "response": response, "done": true }))
                }),
            )
            .with_state(seen)
    }

    async fn assistant(router: Router) -> ResumeAssistant {
        let base = spawn_server(router).await;
        ResumeAssistant::new(OllamaClient::new(LlmClient::new().unwrap(), &base), ChunkConfig::default())
    }

    #[tokio::test]
    async fn test_answer_uses_matching_sections() {
        let seen: Seen = Arc::default();
        let models = json!([{ "name": "llama3.2:3b" }]);
        let assistant = assistant(router(seen.clone(), models, " She knows Python and Rust. ")).await;

        let answer = assistant
            .answer("Which programming languages, like Python or Rust?", RESUME, None, None)
            .await
            .unwrap();

        assert_eq!(answer.answer, "She knows Python and Rust.");
        assert_eq!(answer.model, "llama3.2:3b");
        assert_eq!(answer.sources[0].chunk.id, "skills_2");
        assert!(answer.sources.iter().all(|s| s.score > 0));

        let seen = seen.lock().unwrap();
        let prompt = seen[0]["prompt"].as_str().unwrap();
        assert!(prompt.contains("Question: Which programming languages"));
        assert!(prompt.contains("[skills]"));
    }

    #[tokio::test]
    async fn test_answer_without_models_is_not_configured() {
        let assistant = assistant(router(Arc::default(), json!([]), "unused")).await;
        let err = assistant.answer("Where?", RESUME, None, None).await.unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_insights_object_returned() {
        let seen: Seen = Arc::default();
        let models = json!([{ "name": "phi3:mini" }]);
        let response = "Sure!\n{\"experience_level\": \"Senior\", \"strengths\": \"Backend systems\"}";
        let assistant = assistant(router(seen.clone(), models, response)).await;

        let insights = assistant.generate_insights(RESUME, Some("phi3:mini")).await.unwrap();
        assert_eq!(insights.model, "phi3:mini");
        assert_eq!(insights.insights["experience_level"], "Senior");

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0]["options"]["num_ctx"], 2048);
        assert!(seen[0]["options"].get("top_p").is_none());
    }

    #[tokio::test]
    async fn test_insights_free_text_is_an_error() {
        let models = json!([{ "name": "phi3:mini" }]);
        let assistant = assistant(router(Arc::default(), models, "A strong candidate overall.")).await;
        let err = assistant.generate_insights(RESUME, None).await.unwrap_err();
        assert!(matches!(err, LlmError::UnexpectedResponse(_)));
    }
}
