use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chunking::{chunking_stats, DocumentChunker};
use crate::errors::AppError;
use crate::ingest::{extract_pdf, ExtractedDocument};
use crate::models::chunk::{Chunk, ChunkStrategy, ChunkingStats};
use crate::models::provider::ProviderResult;
use crate::parsing::{Orchestrator, ParseMode, ParseReport};
use crate::providers::ParseOptions;
use crate::qa::{Answer, Insights};
use crate::routes::json::AppJson;
use crate::state::AppState;

/// Fields of a multipart resume upload.
#[derive(Debug, Default)]
struct Upload {
    file_name: Option<String>,
    bytes: Option<Bytes>,
    mode: Option<ParseMode>,
    model: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut upload = Upload::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                upload.file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("could not read upload: {e}")))?;
                upload.bytes = Some(bytes);
            }
            "mode" | "model" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("could not read field '{name}': {e}")))?;
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }
                if name == "mode" {
                    upload.mode = Some(value.parse().map_err(AppError::Validation)?);
                } else {
                    upload.model = Some(value.to_string());
                }
            }
            other => debug!("Ignoring multipart field '{}'", other),
        }
    }
    Ok(upload)
}

/// Runs the PDF extractor off the async executor.
async fn extract_document(upload: &Upload) -> Result<ExtractedDocument, AppError> {
    let bytes = upload
        .bytes
        .clone()
        .ok_or_else(|| AppError::Validation("missing 'file' field".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }

    let document = tokio::task::spawn_blocking(move || extract_pdf(&bytes))
        .await
        .map_err(|e| AppError::UnprocessableEntity(format!("could not read PDF: {e}")))??;
    info!(
        "Extracted {} page(s) from {}",
        document.page_count(),
        upload.file_name.as_deref().unwrap_or("upload")
    );
    Ok(document)
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("'{field}' must not be empty")));
    }
    Ok(())
}

#[derive(Serialize)]
pub struct ExtractResponse {
    pub file_name: Option<String>,
    pub page_count: usize,
    #[serde(flatten)]
    pub document: ExtractedDocument,
}

/// POST /api/v1/resumes/extract
pub async fn handle_extract(multipart: Multipart) -> Result<Json<ExtractResponse>, AppError> {
    let upload = read_upload(multipart).await?;
    let document = extract_document(&upload).await?;
    Ok(Json(ExtractResponse {
        file_name: upload.file_name,
        page_count: document.page_count(),
        document,
    }))
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub file_name: Option<String>,
    pub document: ExtractedDocument,
    pub report: ParseReport,
}

/// POST /api/v1/resumes
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let upload = read_upload(multipart).await?;
    let document = extract_document(&upload).await?;

    let mode = upload.mode.unwrap_or_default();
    let options = ParseOptions { model: upload.model };
    let report = Orchestrator::for_mode(&state.registry, mode, &state.config.provider_order)
        .parse(mode, &document.text, &options)
        .await;
    info!(
        "Upload {} parsed by {}",
        upload.file_name.as_deref().unwrap_or("-"),
        report.result.provider()
    );

    Ok(Json(UploadResponse {
        file_name: upload.file_name,
        document,
        report,
    }))
}

#[derive(Deserialize)]
pub struct ParseRequest {
    pub text: String,
    #[serde(default)]
    pub mode: ParseMode,
    pub model: Option<String>,
}

/// POST /api/v1/resumes/parse
pub async fn handle_parse(
    State(state): State<AppState>,
    AppJson(req): AppJson<ParseRequest>,
) -> Result<Json<ParseReport>, AppError> {
    require_text("text", &req.text)?;
    let options = ParseOptions { model: req.model };
    let report = Orchestrator::for_mode(&state.registry, req.mode, &state.config.provider_order)
        .parse(req.mode, &req.text, &options)
        .await;
    Ok(Json(report))
}

#[derive(Deserialize)]
pub struct ChunkRequest {
    pub text: String,
    pub pages: Option<Vec<String>>,
    #[serde(default)]
    pub strategy: ChunkStrategy,
}

#[derive(Serialize)]
pub struct ChunkResponse {
    pub chunks: Vec<Chunk>,
    pub stats: ChunkingStats,
}

/// POST /api/v1/resumes/chunks
pub async fn handle_chunks(
    State(state): State<AppState>,
    AppJson(req): AppJson<ChunkRequest>,
) -> Result<Json<ChunkResponse>, AppError> {
    let has_pages = req.pages.as_ref().is_some_and(|p| p.iter().any(|page| !page.trim().is_empty()));
    if !has_pages {
        require_text("text", &req.text)?;
    }

    let chunks = DocumentChunker::new(state.config.chunking).chunk(&req.text, req.pages.as_deref(), req.strategy);
    let stats = chunking_stats(&chunks);
    Ok(Json(ChunkResponse { chunks, stats }))
}

#[derive(Deserialize)]
pub struct AskRequest {
    pub question: String,
    pub text: String,
    pub pages: Option<Vec<String>>,
    pub model: Option<String>,
}

/// POST /api/v1/resumes/ask
pub async fn handle_ask(
    State(state): State<AppState>,
    AppJson(req): AppJson<AskRequest>,
) -> Result<Json<Answer>, AppError> {
    require_text("question", &req.question)?;
    require_text("text", &req.text)?;
    let answer = state
        .assistant
        .answer(req.question.trim(), &req.text, req.pages.as_deref(), req.model.as_deref())
        .await?;
    Ok(Json(answer))
}

#[derive(Deserialize)]
pub struct InsightsRequest {
    pub text: String,
    pub model: Option<String>,
}

/// POST /api/v1/resumes/insights
pub async fn handle_insights(
    State(state): State<AppState>,
    AppJson(req): AppJson<InsightsRequest>,
) -> Result<Json<Insights>, AppError> {
    require_text("text", &req.text)?;
    let insights = state
        .assistant
        .generate_insights(&req.text, req.model.as_deref())
        .await?;
    Ok(Json(insights))
}

/// POST /api/v1/resumes/export
/// Returns the result as a pretty-printed JSON download.
pub async fn handle_export(AppJson(result): AppJson<ProviderResult>) -> Result<impl IntoResponse, AppError> {
    let file_name = match &result {
        ProviderResult::Parsed(record) => record.export_file_name(),
        ProviderResult::RawText(_) => "parsed_resume_raw.json".to_string(),
        ProviderResult::Failed(_) => {
            return Err(AppError::Validation(
                "a failed provider result has nothing to export".to_string(),
            ))
        }
    };

    let body = serde_json::to_string_pretty(&result).map_err(|e| AppError::Internal(e.into()))?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    ))
}
