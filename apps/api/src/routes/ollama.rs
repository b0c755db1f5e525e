use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::providers::ollama::{recommended_models, PullOutcome};
use crate::routes::json::AppJson;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ModelsResponse {
    pub installed: Vec<String>,
    pub recommended: Vec<String>,
}

/// GET /api/v1/ollama/models
pub async fn handle_list_models(State(state): State<AppState>) -> Result<Json<ModelsResponse>, AppError> {
    let installed = state.ollama.list_models().await?;
    let recommended = recommended_models(&installed);
    Ok(Json(ModelsResponse { installed, recommended }))
}

#[derive(Deserialize)]
pub struct PullModelRequest {
    pub name: String,
}

/// POST /api/v1/ollama/models/pull
/// Blocks until the pull finishes.
pub async fn handle_pull_model(
    State(state): State<AppState>,
    AppJson(req): AppJson<PullModelRequest>,
) -> Result<Json<PullOutcome>, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("'name' must not be empty".to_string()));
    }
    let outcome = state.ollama.pull_model(name).await?;
    Ok(Json(outcome))
}
