use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::resume::{Provenance, StructuredResume};

/// Identifier of an inference backend (or the offline extractor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "google_gemini")]
    Gemini,
    #[serde(rename = "huggingface")]
    HuggingFace,
    #[serde(rename = "ollama")]
    Ollama,
    #[serde(rename = "offline")]
    Offline,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "google_gemini",
            ProviderKind::HuggingFace => "huggingface",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Offline => "offline",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Gemini => "Google Gemini",
            ProviderKind::HuggingFace => "HuggingFace",
            ProviderKind::Ollama => "Ollama (local)",
            ProviderKind::Offline => "Offline parser",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" | "google_gemini" => Ok(ProviderKind::Gemini),
            "huggingface" | "hf" => Ok(ProviderKind::HuggingFace),
            "ollama" => Ok(ProviderKind::Ollama),
            "offline" => Ok(ProviderKind::Offline),
            other => Err(format!("unknown provider '{other}'")),
        }
    }
}

/// Why a provider attempt produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Missing key or unreachable local server. Recorded as a skip.
    Unavailable,
    /// Connection error or timeout.
    Transport,
    /// Non-success HTTP status (quota, auth, server error).
    Status,
    /// A response arrived but had no usable content.
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub provider: ProviderKind,
    pub kind: FailureKind,
    pub message: String,
}

/// Model output that could not be decoded as a structured record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOutput {
    pub raw_output: String,
    pub provenance: Provenance,
}

/// Outcome of one provider call. Exactly one of a record, raw text or an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderResult {
    Parsed(StructuredResume),
    RawText(RawOutput),
    Failed(ProviderFailure),
}

impl ProviderResult {
    pub fn failed(provider: ProviderKind, kind: FailureKind, message: impl Into<String>) -> Self {
        ProviderResult::Failed(ProviderFailure {
            provider,
            kind,
            message: message.into(),
        })
    }

    /// The provider that produced this result.
    pub fn provider(&self) -> ProviderKind {
        match self {
            ProviderResult::Parsed(r) => r.provenance.provider,
            ProviderResult::RawText(r) => r.provenance.provider,
            ProviderResult::Failed(f) => f.provider,
        }
    }

    pub fn provenance(&self) -> Option<&Provenance> {
        match self {
            ProviderResult::Parsed(r) => Some(&r.provenance),
            ProviderResult::RawText(r) => Some(&r.provenance),
            ProviderResult::Failed(_) => None,
        }
    }
}
