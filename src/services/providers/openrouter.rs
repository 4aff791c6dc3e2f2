/// OpenRouter provider
///
/// OpenAI-compatible chat completions. OpenRouter asks callers to identify
/// themselves with `HTTP-Referer` and `X-Title` headers.
use reqwest::Client as HttpClient;

use super::{openai_compat, ChatProvider, ProviderConfig, ProviderError};
use crate::models::ChatMessage;

pub const NAME: &str = "openrouter";
const APP_TITLE: &str = "CimaBot";

#[derive(Clone)]
pub struct OpenRouterProvider {
    http_client: HttpClient,
    config: ProviderConfig,
    referer: String,
}

impl OpenRouterProvider {
    pub fn new(http_client: HttpClient, config: ProviderConfig, referer: String) -> Self {
        Self {
            http_client,
            config,
            referer,
        }
    }
}

#[async_trait::async_trait]
impl ChatProvider for OpenRouterProvider {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        openai_compat::chat_completion(
            &self.http_client,
            &self.config,
            messages,
            &[("HTTP-Referer", self.referer.as_str()), ("X-Title", APP_TITLE)],
        )
        .await
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
