//! Anthropic and OpenAI HTTP clients behind one provider.

use crate::completion::domain::{
    CompletionOptions, CompletionPrompt, ProviderKind, ProviderSettings,
};
use crate::completion::ports::{CompletionError, CompletionProvider, CompletionResult};
use async_trait::async_trait;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Provider-agnostic HTTP completion client.
#[derive(Debug, Clone)]
pub struct HttpCompletionProvider {
    client: Client,
    settings: ProviderSettings,
    base_url: String,
}

impl HttpCompletionProvider {
    /// Creates a client for the configured backend.
    #[must_use]
    pub fn new(settings: ProviderSettings) -> Self {
        let base_url = settings.kind.default_base_url().to_owned();
        Self {
            client: Client::new(),
            settings,
            base_url,
        }
    }

    /// Points the client at another base URL (proxies, local stubs).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    async fn complete_anthropic(
        &self,
        prompt: &CompletionPrompt,
        options: &CompletionOptions,
    ) -> CompletionResult<String> {
        let body = AnthropicRequest {
            model: &self.settings.model,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            system: (!prompt.system.is_empty()).then_some(prompt.system.as_str()),
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt.user,
            }],
        };
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(CompletionError::unavailable)?;
        let parsed: AnthropicResponse = decode(response).await?;

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .map(|text| text.trim().to_owned())
            .ok_or_else(|| CompletionError::InvalidResponse("no text block in answer".to_owned()))
    }

    async fn complete_openai(
        &self,
        prompt: &CompletionPrompt,
        options: &CompletionOptions,
    ) -> CompletionResult<String> {
        let mut messages = Vec::with_capacity(2);
        if !prompt.system.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: &prompt.system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &prompt.user,
        });
        let body = OpenAiRequest {
            model: &self.settings.model,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            messages,
        };
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(CompletionError::unavailable)?;
        let parsed: OpenAiResponse = decode(response).await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_owned())
            .ok_or_else(|| CompletionError::InvalidResponse("no choices in answer".to_owned()))
    }
}

async fn decode<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> CompletionResult<T> {
    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(CompletionError::InvalidResponse(format!(
            "HTTP {status}: {detail}"
        )));
    }
    response
        .json::<T>()
        .await
        .map_err(|err| CompletionError::InvalidResponse(err.to_string()))
}

#[async_trait]
impl CompletionProvider for HttpCompletionProvider {
    async fn complete(
        &self,
        prompt: &CompletionPrompt,
        options: &CompletionOptions,
    ) -> CompletionResult<String> {
        let call = async {
            match self.settings.kind {
                ProviderKind::Anthropic => self.complete_anthropic(prompt, options).await,
                ProviderKind::OpenAi => self.complete_openai(prompt, options).await,
            }
        };
        tokio::time::timeout(options.timeout, call)
            .await
            .map_err(|_| CompletionError::Timeout(options.timeout))?
    }

    fn provider_name(&self) -> &'static str {
        self.settings.kind.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn anthropic_body_omits_empty_system() {
        let body = AnthropicRequest {
            model: "claude-sonnet-4-20250514",
            max_tokens: 50,
            temperature: 0.0,
            system: None,
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
        };
        let value = serde_json::to_value(&body).expect("serialises");
        assert!(value.get("system").is_none());
        assert_eq!(value["messages"][0]["role"], json!("user"));
    }

    #[test]
    fn anthropic_answer_takes_first_text_block() {
        let parsed: AnthropicResponse = serde_json::from_value(json!({
            "content": [{"type": "thinking"}, {"type": "text", "text": " park street|harvard \n"}]
        }))
        .expect("parses");
        let text = parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text);
        assert_eq!(text.as_deref().map(str::trim), Some("park street|harvard"));
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let provider = HttpCompletionProvider::new(ProviderSettings {
            kind: ProviderKind::OpenAi,
            api_key: "key".to_owned(),
            model: "gpt-4o-mini".to_owned(),
        })
        .with_base_url("http://127.0.0.1:9/");
        assert_eq!(provider.base_url, "http://127.0.0.1:9");
        assert_eq!(provider.provider_name(), "openai");
    }
}
