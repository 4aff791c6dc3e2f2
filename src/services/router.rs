use std::sync::Arc;

use reqwest::Client as HttpClient;
use tracing::instrument;

use crate::{
    config::Config,
    models::ChatMessage,
    services::providers::{
        ChatProvider, GeminiProvider, GroqProvider, OpenRouterProvider, ProviderConfig,
    },
};

pub const NO_PROVIDER_ERROR: &str = "Error: no AI provider API key is configured.";
pub const ALL_FAILED_ERROR: &str = "Error: all AI providers failed. Check the configured API keys.";

/// Fallback chain over the configured AI providers
///
/// Providers are tried once each, in order. The first successful answer
/// wins; failures are logged and skipped. Callers always get a string back:
/// the answer, or a message starting with `"Error:"`.
#[derive(Clone, Default)]
pub struct ProviderRouter {
    providers: Vec<Arc<dyn ChatProvider>>,
}

impl ProviderRouter {
    pub fn new(providers: Vec<Arc<dyn ChatProvider>>) -> Self {
        Self { providers }
    }

    /// Builds the chain OpenRouter → Gemini → Groq from whichever keys are set.
    pub fn from_config(config: &Config, http_client: HttpClient) -> Self {
        let mut providers: Vec<Arc<dyn ChatProvider>> = Vec::new();

        if let Some(provider_config) = ProviderConfig::openrouter(config) {
            providers.push(Arc::new(OpenRouterProvider::new(
                http_client.clone(),
                provider_config,
                config.app_url.clone(),
            )));
        }
        if let Some(provider_config) = ProviderConfig::gemini(config) {
            providers.push(Arc::new(GeminiProvider::new(
                http_client.clone(),
                provider_config,
            )));
        }
        if let Some(provider_config) = ProviderConfig::groq(config) {
            providers.push(Arc::new(GroqProvider::new(http_client, provider_config)));
        }

        if providers.is_empty() {
            tracing::error!("No AI provider API key configured; chat features will return errors");
        }

        Self::new(providers)
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    #[instrument(skip_all, fields(turns = messages.len()))]
    pub async fn generate(&self, messages: &[ChatMessage]) -> String {
        if self.providers.is_empty() {
            return NO_PROVIDER_ERROR.to_string();
        }

        for provider in &self.providers {
            match provider.generate(messages).await {
                Ok(text) => {
                    tracing::info!(
                        provider = provider.name(),
                        chars = text.len(),
                        "AI response received"
                    );
                    return text;
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %e,
                        "AI provider failed, falling back"
                    );
                }
            }
        }

        tracing::error!(
            providers = ?self.provider_names(),
            "All AI providers failed"
        );
        ALL_FAILED_ERROR.to_string()
    }
}
