use axum::{extract::State, Json};
use serde::Serialize;

use crate::models::provider::ProviderKind;
use crate::providers::ProviderStatus;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderStatus>,
    /// Cloud-mode order, ending at the offline extractor.
    pub chain: Vec<ProviderKind>,
}

/// GET /api/v1/providers
pub async fn handle_list_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    let providers = state.registry.statuses().await;
    let chain = state
        .config
        .provider_order
        .iter()
        .copied()
        .chain(std::iter::once(ProviderKind::Offline))
        .collect();
    Json(ProvidersResponse { providers, chain })
}
