//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API.
//! The default deployment targets Groq (`https://api.groq.com/openai/v1`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{Error, Result};

use super::types::{ChatRequest, MAX_TOKENS, TEMPERATURE, TOP_P};
use super::ChatBackend;

/// OpenAI-compatible backend
///
/// Posts to `{base_url}/chat/completions` with a bearer credential supplied
/// per call.
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create a backend whose calls time out after `timeout`
    pub fn with_timeout(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// Create from provider settings
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config.timeout {
            Some(timeout) => Self::with_timeout(&config.base_url, &config.model, timeout),
            None => Ok(Self::new(&config.base_url, &config.model)),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// OpenAI chat completion response
///
/// Every level is optional so a well-formed reply without a message maps to
/// `None` instead of a decode error.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatResponseMessage>,
}

/// Chat response message
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ChatBackend for OpenAICompatibleBackend {
    async fn complete(&self, api_key: &str, request: &ChatRequest) -> Result<Option<String>> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            top_p: TOP_P,
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let details = response.text().await.unwrap_or_default();
            return Err(Error::Provider {
                status: status.as_u16(),
                details,
            });
        }

        let chat_response: ChatCompletionResponse = response.json().await?;
        debug!(choices = chat_response.choices.len(), "Chat completion received");

        Ok(chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|content| !content.is_empty()))
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockProviderServer, MockServerReply};

    fn chat() -> ChatRequest {
        ChatRequest::new("You are an analyst.", "Explain Acme.")
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let backend = OpenAICompatibleBackend::new("https://api.groq.com/openai/v1/", "m");
        assert_eq!(
            backend.endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_complete_returns_message_and_sends_fixed_params() {
        let server = MockProviderServer::start(MockServerReply::Text("Acme is visible.".into())).await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "openai/gpt-oss-120b");

        let text = backend.complete("gsk_test", &chat()).await.unwrap();
        assert_eq!(text.as_deref(), Some("Acme is visible."));
        assert_eq!(server.call_count(), 1);

        let captured = server.last_request().unwrap();
        assert_eq!(captured.authorization.as_deref(), Some("Bearer gsk_test"));
        assert_eq!(captured.body["model"], "openai/gpt-oss-120b");
        assert_eq!(captured.body["messages"][0]["role"], "system");
        assert_eq!(captured.body["messages"][1]["content"], "Explain Acme.");
        assert_eq!(captured.body["max_tokens"], 300);
        assert!((captured.body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((captured.body["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_complete_without_choices_is_none() {
        let server = MockProviderServer::start(MockServerReply::NoChoices).await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "m");
        assert_eq!(backend.complete("k", &chat()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_complete_maps_status_to_provider_error() {
        let server =
            MockProviderServer::start(MockServerReply::Status(429, "rate limited".into())).await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "m");

        match backend.complete("k", &chat()).await {
            Err(Error::Provider { status, details }) => {
                assert_eq!(status, 429);
                assert!(details.contains("rate limited"));
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_malformed_body_is_http_error() {
        let server = MockProviderServer::start(MockServerReply::Malformed).await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "m");
        assert!(matches!(
            backend.complete("k", &chat()).await,
            Err(Error::Http(_))
        ));
    }

    #[tokio::test]
    async fn test_complete_unreachable_is_http_error() {
        let backend = OpenAICompatibleBackend::new("http://127.0.0.1:1", "m");
        assert!(matches!(
            backend.complete("k", &chat()).await,
            Err(Error::Http(_))
        ));
    }
}
