//! Provider fallback chain.
//!
//! Providers are tried in order and the first record or raw text wins. An
//! `Unavailable` result is recorded as a skip, any other failure is logged
//! and the next provider tried. Each adapter checks its own availability
//! inside `parse`, so a provider is contacted once per attempt. The registry's
//! offline provider always closes the chain, so `parse` cannot fail.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::provider::{FailureKind, ProviderKind, ProviderResult};
use crate::providers::{OfflineProvider, ParseOptions, ProviderRegistry, ResumeProvider};

/// Set on the offline record when it was reached by exhausting the chain.
pub const ALL_PROVIDERS_FAILED: &str = "all_ai_providers_failed";

/// Which backends a request may use. Every mode ends at the offline extractor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// The configured remote chain.
    #[default]
    Cloud,
    /// The local model server only.
    Local,
    /// No model at all.
    Offline,
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cloud" => Ok(ParseMode::Cloud),
            "local" => Ok(ParseMode::Local),
            "offline" => Ok(ParseMode::Offline),
            other => Err(format!("unknown parse mode '{other}', expected cloud, local or offline")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Succeeded,
    Skipped { reason: String },
    Failed { kind: FailureKind, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderAttempt {
    pub provider: ProviderKind,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
    pub elapsed_ms: u64,
}

/// What a parse request produced, and how it got there.
#[derive(Debug, Clone, Serialize)]
pub struct ParseReport {
    pub request_id: Uuid,
    pub mode: ParseMode,
    pub result: ProviderResult,
    pub attempts: Vec<ProviderAttempt>,
}

pub struct Orchestrator {
    chain: Vec<Arc<dyn ResumeProvider>>,
    terminal: Arc<dyn ResumeProvider>,
}

impl Orchestrator {
    pub fn new(chain: Vec<Arc<dyn ResumeProvider>>) -> Self {
        Self::with_terminal(chain, Arc::new(OfflineProvider))
    }

    /// `terminal` runs when the chain is exhausted and must not fail.
    pub fn with_terminal(chain: Vec<Arc<dyn ResumeProvider>>, terminal: Arc<dyn ResumeProvider>) -> Self {
        Self { chain, terminal }
    }

    /// Builds the chain for `mode` from the registry. `order` is the
    /// configured remote order.
    pub fn for_mode(registry: &ProviderRegistry, mode: ParseMode, order: &[ProviderKind]) -> Self {
        let chain = match mode {
            ParseMode::Cloud => registry.chain(order),
            ParseMode::Local => registry.chain(&[ProviderKind::Ollama]),
            ParseMode::Offline => Vec::new(),
        };
        let terminal = registry
            .get(ProviderKind::Offline)
            .unwrap_or_else(|| Arc::new(OfflineProvider));
        Self::with_terminal(chain, terminal)
    }

    pub async fn parse(&self, mode: ParseMode, text: &str, options: &ParseOptions) -> ParseReport {
        let request_id = Uuid::new_v4();
        let mut attempts = Vec::with_capacity(self.chain.len() + 1);

        for provider in &self.chain {
            let kind = provider.kind();
            let started = Instant::now();
            let result = provider.parse(text, options).await;
            let elapsed = elapsed_ms(started);

            if let ProviderResult::Failed(failure) = &result {
                if failure.kind == FailureKind::Unavailable {
                    info!(%request_id, "{} is not available ({}), skipping", kind.display_name(), failure.message);
                    attempts.push(ProviderAttempt {
                        provider: kind,
                        outcome: AttemptOutcome::Skipped {
                            reason: failure.message.clone(),
                        },
                        elapsed_ms: elapsed,
                    });
                    continue;
                }
                warn!(
                    %request_id,
                    "{} failed ({:?}): {}, trying next provider",
                    kind.display_name(),
                    failure.kind,
                    failure.message
                );
                attempts.push(ProviderAttempt {
                    provider: kind,
                    outcome: AttemptOutcome::Failed {
                        kind: failure.kind,
                        message: failure.message.clone(),
                    },
                    elapsed_ms: elapsed,
                });
                continue;
            }

            let model = result.provenance().and_then(|p| p.model.as_deref()).unwrap_or("-");
            info!(%request_id, "Parsed with {} ({}) in {}ms", kind.display_name(), model, elapsed);
            attempts.push(ProviderAttempt {
                provider: kind,
                outcome: AttemptOutcome::Succeeded,
                elapsed_ms: elapsed,
            });
            return ParseReport {
                request_id,
                mode,
                result,
                attempts,
            };
        }

        let started = Instant::now();
        let mut result = self.terminal.parse(text, options).await;
        if !self.chain.is_empty() {
            warn!(%request_id, "All AI providers failed, using the offline parser");
            if let ProviderResult::Parsed(record) = &mut result {
                record.provenance.fallback_reason = Some(ALL_PROVIDERS_FAILED.to_string());
            }
        }
        attempts.push(ProviderAttempt {
            provider: self.terminal.kind(),
            outcome: AttemptOutcome::Succeeded,
            elapsed_ms: elapsed_ms(started),
        });

        ParseReport {
            request_id,
            mode,
            result,
            attempts,
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().try_into().unwrap_or(u64::MAX)
}
