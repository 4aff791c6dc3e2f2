/// Groq provider, via its OpenAI-compatible endpoint
use reqwest::Client as HttpClient;

use super::{openai_compat, ChatProvider, ProviderConfig, ProviderError};
use crate::models::ChatMessage;

pub const NAME: &str = "groq";

#[derive(Clone)]
pub struct GroqProvider {
    http_client: HttpClient,
    config: ProviderConfig,
}

impl GroqProvider {
    pub fn new(http_client: HttpClient, config: ProviderConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }
}

#[async_trait::async_trait]
impl ChatProvider for GroqProvider {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        openai_compat::chat_completion(&self.http_client, &self.config, messages, &[]).await
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
