//! Shared plumbing for vendors speaking the OpenAI chat-completions dialect.

use reqwest::Client as HttpClient;
use serde::Serialize;
use serde_json::Value;

use super::{ProviderConfig, ProviderError, MAX_TOKENS, TEMPERATURE};
use crate::models::ChatMessage;

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

/// POSTs `messages` to a chat-completions endpoint and extracts the answer.
pub(super) async fn chat_completion(
    http_client: &HttpClient,
    config: &ProviderConfig,
    messages: &[ChatMessage],
    extra_headers: &[(&str, &str)],
) -> Result<String, ProviderError> {
    let body = ChatCompletionRequest {
        model: &config.model,
        messages,
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    };

    let mut request = http_client
        .post(&config.endpoint)
        .bearer_auth(&config.api_key)
        .timeout(config.timeout)
        .json(&body);

    for (name, value) in extra_headers {
        request = request.header(*name, *value);
    }

    let response = request.send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api { status, message });
    }

    let data: Value = response.json().await?;
    Ok(extract_text(&data))
}

/// Reads `choices[0].message.content`, or an empty string when absent.
pub(super) fn extract_text(data: &Value) -> String {
    data.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
