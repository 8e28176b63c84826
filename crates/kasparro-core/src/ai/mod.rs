//! Pluggable chat-completion backend abstraction
//!
//! # Architecture
//!
//! - `ChatBackend` trait: a single two-message completion call
//! - `ProviderClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//!
//! The credential is passed into every call rather than stored in the backend,
//! so it can be re-read from the environment per request.
//!
//! # Configuration
//!
//! See [`crate::config::ProviderConfig`]. `KASPARRO_PROVIDER=mock` selects the
//! mock backend for local development.

mod mock;
mod openai_compatible;
pub mod types;

pub use mock::{MockBackend, MockReply};
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::*;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::Result;

/// Trait defining the interface for chat-completion backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Run one completion
    ///
    /// Returns `Ok(None)` when the provider answered successfully but carried
    /// no message text. A non-success HTTP status is `Error::Provider`.
    async fn complete(&self, api_key: &str, request: &ChatRequest) -> Result<Option<String>>;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete provider client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum ProviderClient {
    /// OpenAI-compatible backend (Groq by default)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl ProviderClient {
    /// Create a provider client from provider settings
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        OpenAICompatibleBackend::from_config(config).map(ProviderClient::OpenAICompatible)
    }

    /// Create a provider client from environment variables
    ///
    /// Checks `KASPARRO_PROVIDER`:
    /// - `groq` / `openai_compatible` (default): uses [`ProviderConfig::from_env`]
    /// - `mock`: canned replies, no network
    pub fn from_env() -> Result<Self> {
        let backend = std::env::var("KASPARRO_PROVIDER").unwrap_or_else(|_| "groq".to_string());

        match backend.trim().to_lowercase().as_str() {
            "groq" | "openai_compatible" | "openai" => {
                Self::from_config(&ProviderConfig::from_env())
            }
            "mock" => Ok(ProviderClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown KASPARRO_PROVIDER, falling back to groq");
                Self::from_config(&ProviderConfig::from_env())
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock(backend: MockBackend) -> Self {
        ProviderClient::Mock(backend)
    }

    /// Connection details for display
    pub fn info(&self) -> ProviderInfo {
        let kind = match self {
            ProviderClient::OpenAICompatible(_) => "openai_compatible",
            ProviderClient::Mock(_) => "mock",
        };
        ProviderInfo {
            kind,
            host: self.host().to_string(),
            model: self.model().to_string(),
        }
    }
}

#[async_trait]
impl ChatBackend for ProviderClient {
    async fn complete(&self, api_key: &str, request: &ChatRequest) -> Result<Option<String>> {
        match self {
            ProviderClient::OpenAICompatible(b) => b.complete(api_key, request).await,
            ProviderClient::Mock(b) => b.complete(api_key, request).await,
        }
    }

    fn model(&self) -> &str {
        match self {
            ProviderClient::OpenAICompatible(b) => b.model(),
            ProviderClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            ProviderClient::OpenAICompatible(b) => b.host(),
            ProviderClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_uses_settings() {
        let config = ProviderConfig {
            base_url: "http://localhost:9999/v1".into(),
            model: "llama-3.1-8b-instant".into(),
            timeout: Some(std::time::Duration::from_secs(5)),
        };
        let client = ProviderClient::from_config(&config).unwrap();
        let info = client.info();
        assert_eq!(info.kind, "openai_compatible");
        assert_eq!(info.host, "http://localhost:9999/v1");
        assert_eq!(info.model, "llama-3.1-8b-instant");
    }

    #[tokio::test]
    async fn test_mock_dispatch() {
        let mock = MockBackend::with_reply(MockReply::Text("hello".into()));
        let client = ProviderClient::mock(mock.clone());
        let out = client
            .complete("k", &ChatRequest::new("s", "u"))
            .await
            .unwrap();
        assert_eq!(out.as_deref(), Some("hello"));
        assert_eq!(mock.calls(), 1);
        assert_eq!(client.info().kind, "mock");
    }
}
