use async_trait::async_trait;

use super::{ParseOptions, ResumeProvider};
use crate::extraction::offline_extract;
use crate::models::provider::{ProviderKind, ProviderResult};

/// The regex extractor as a provider. Always available, never fails.
pub struct OfflineProvider;

#[async_trait]
impl ResumeProvider for OfflineProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Offline
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn parse(&self, text: &str, _options: &ParseOptions) -> ProviderResult {
        ProviderResult::Parsed(offline_extract(text))
    }
}
