/// Google Gemini provider (Generative Language `generateContent` REST API)
///
/// Gemini gets the conversation as one flattened prompt of `role: content`
/// lines. Images attached to any turn are sent alongside as `inline_data`
/// parts.
use reqwest::Client as HttpClient;
use serde::Serialize;
use serde_json::Value;

use super::{ChatProvider, ProviderConfig, ProviderError, MAX_TOKENS, TEMPERATURE};
use crate::models::ChatMessage;

pub const NAME: &str = "gemini";

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Clone)]
pub struct GeminiProvider {
    http_client: HttpClient,
    config: ProviderConfig,
}

impl GeminiProvider {
    pub fn new(http_client: HttpClient, config: ProviderConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// `{api_url}/models/{model}:generateContent`; accepts models given
    /// with or without the `models/` prefix.
    fn url(&self) -> String {
        let model = self
            .config
            .model
            .strip_prefix("models/")
            .unwrap_or(&self.config.model);
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            model
        )
    }
}

/// Flattens the conversation into `role: content` lines ending with an
/// `assistant:` cue.
pub fn flatten_prompt(messages: &[ChatMessage]) -> String {
    let mut lines: Vec<String> = messages
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content.text()))
        .collect();
    lines.push("assistant:".to_string());
    lines.join("\n")
}

fn build_request(messages: &[ChatMessage]) -> GenerateContentRequest {
    let mut parts = vec![Part::Text {
        text: flatten_prompt(messages),
    }];

    parts.extend(
        messages
            .iter()
            .flat_map(|m| m.content.images())
            .map(|image| Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type,
                    data: image.base64,
                },
            }),
    );

    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts,
        }],
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            max_output_tokens: MAX_TOKENS,
        },
    }
}

/// Reads the text parts of `candidates[0].content.parts`, or an empty
/// string when absent.
pub fn extract_text(data: &Value) -> String {
    data.pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl ChatProvider for GeminiProvider {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let response = self
            .http_client
            .post(self.url())
            .header("x-goog-api-key", &self.config.api_key)
            .timeout(self.config.timeout)
            .json(&build_request(messages))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, message });
        }

        let data: Value = response.json().await?;
        Ok(extract_text(&data))
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
