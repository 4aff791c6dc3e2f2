/// AI provider abstraction
///
/// Each vendor (OpenRouter, Gemini, Groq) sits behind the same `ChatProvider`
/// trait so the router can walk a fallback chain without knowing payload
/// shapes. Adapters only report failures; deciding what to do about them is
/// the router's job.
use std::time::Duration;

use crate::{config::Config, models::ChatMessage};

pub mod gemini;
pub mod groq;
mod openai_compat;
pub mod openrouter;

pub use gemini::GeminiProvider;
pub use groq::GroqProvider;
pub use openrouter::OpenRouterProvider;

/// Sampling temperature shared by all vendors
pub const TEMPERATURE: f32 = 0.7;

/// Upper bound on generated tokens per answer
pub const MAX_TOKENS: u32 = 800;

/// Failure of a single provider call
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Connection settings for one vendor
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub name: &'static str,
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn openrouter(config: &Config) -> Option<Self> {
        Some(Self {
            name: openrouter::NAME,
            endpoint: config.openrouter_api_url.clone(),
            api_key: config.openrouter_api_key.clone()?,
            model: config.openrouter_model.clone(),
            timeout: Duration::from_secs(config.ai_timeout),
        })
    }

    pub fn gemini(config: &Config) -> Option<Self> {
        Some(Self {
            name: gemini::NAME,
            endpoint: config.gemini_api_url.clone(),
            api_key: config.gemini_api_key.clone()?,
            model: config.gemini_model.clone(),
            timeout: Duration::from_secs(config.ai_timeout),
        })
    }

    pub fn groq(config: &Config) -> Option<Self> {
        Some(Self {
            name: groq::NAME,
            endpoint: config.groq_api_url.clone(),
            api_key: config.groq_api_key.clone()?,
            model: config.groq_model.clone(),
            timeout: Duration::from_secs(config.ai_timeout),
        })
    }
}

/// Trait for AI text-generation backends
///
/// `generate` receives the full conversation, system prompt first, and
/// returns the model's answer. A response missing the answer field yields an
/// empty string, not an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ProviderError>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
