use anyhow::{anyhow, bail, Context, Result};

use crate::chunking::ChunkConfig;
use crate::models::provider::ProviderKind;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_HUGGINGFACE_BASE_URL: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

const DEFAULT_OPENAI_MODELS: &[&str] = &["gpt-3.5-turbo", "gpt-3.5-turbo-16k", "gpt-4", "gpt-4-turbo"];
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_HUGGINGFACE_MODELS: &[&str] = &[
    "microsoft/DialoGPT-large",
    "google/flan-t5-large",
    "mistralai/Mistral-7B-Instruct-v0.1",
    "HuggingFaceH4/zephyr-7b-beta",
];
const DEFAULT_PROVIDER_ORDER: &str = "openai,gemini,huggingface";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable is optional; a provider without its key is simply
/// reported as unavailable at request time.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub openai: OpenAiConfig,
    pub gemini: GeminiConfig,
    pub huggingface: HuggingFaceConfig,
    pub ollama_base_url: String,
    /// Remote chain for the default parse mode. Offline is appended at run time.
    pub provider_order: Vec<ProviderKind>,
    pub chunking: ChunkConfig,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub models: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub models: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let chunking = ChunkConfig {
            chunk_size: parse_or(var("CHUNK_SIZE"), "CHUNK_SIZE", 300)?,
            min_chunk_size: parse_or(var("MIN_CHUNK_SIZE"), "MIN_CHUNK_SIZE", 100)?,
            ..ChunkConfig::default()
        };
        if chunking.chunk_size == 0 {
            bail!("CHUNK_SIZE must be greater than zero");
        }

        Ok(Config {
            port: parse_or(var("PORT"), "PORT", 8080u16)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            openai: OpenAiConfig {
                api_key: var("OPENAI_API_KEY"),
                base_url: base_url(var("OPENAI_BASE_URL"), DEFAULT_OPENAI_BASE_URL),
                models: list_or(var("OPENAI_MODELS"), DEFAULT_OPENAI_MODELS),
            },
            gemini: GeminiConfig {
                api_key: var("GOOGLE_GEMINI_API_KEY"),
                base_url: base_url(var("GEMINI_BASE_URL"), DEFAULT_GEMINI_BASE_URL),
                model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            },
            huggingface: HuggingFaceConfig {
                api_key: var("HUGGINGFACE_API_KEY"),
                base_url: base_url(var("HUGGINGFACE_BASE_URL"), DEFAULT_HUGGINGFACE_BASE_URL),
                models: list_or(var("HUGGINGFACE_MODELS"), DEFAULT_HUGGINGFACE_MODELS),
            },
            ollama_base_url: base_url(var("OLLAMA_BASE_URL"), DEFAULT_OLLAMA_BASE_URL),
            provider_order: parse_provider_order(
                var("PROVIDER_ORDER").as_deref().unwrap_or(DEFAULT_PROVIDER_ORDER),
            )?,
            chunking,
            max_upload_bytes: parse_or(var("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

impl Default for Config {
    /// Defaults with no provider keys configured.
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            openai: OpenAiConfig {
                api_key: None,
                base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
                models: to_strings(DEFAULT_OPENAI_MODELS),
            },
            gemini: GeminiConfig {
                api_key: None,
                base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
                model: DEFAULT_GEMINI_MODEL.to_string(),
            },
            huggingface: HuggingFaceConfig {
                api_key: None,
                base_url: DEFAULT_HUGGINGFACE_BASE_URL.to_string(),
                models: to_strings(DEFAULT_HUGGINGFACE_MODELS),
            },
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            provider_order: vec![ProviderKind::OpenAi, ProviderKind::Gemini, ProviderKind::HuggingFace],
            chunking: ChunkConfig::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Parses a comma-separated provider list. Duplicates are dropped; the
/// offline extractor is always the implicit last step and may not be listed.
pub fn parse_provider_order(raw: &str) -> Result<Vec<ProviderKind>> {
    let mut order = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind: ProviderKind = name
            .parse()
            .map_err(|e: String| anyhow!("PROVIDER_ORDER contains an unknown provider: {e}"))?;
        if kind == ProviderKind::Offline {
            bail!("PROVIDER_ORDER must not list 'offline'; it always runs last");
        }
        if !order.contains(&kind) {
            order.push(kind);
        }
    }
    Ok(order)
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .parse::<T>()
            .ok()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

fn list_or(value: Option<String>, default: &[&str]) -> Vec<String> {
    let items: Vec<String> = value
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if items.is_empty() {
        to_strings(default)
    } else {
        items
    }
}

fn base_url(value: Option<String>, default: &str) -> String {
    value.unwrap_or_else(|| default.to_string()).trim_end_matches('/').to_string()
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
