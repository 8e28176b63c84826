//! Provider configuration from the process environment
//!
//! Environment variables:
//! - `GROQ_API_KEY`: provider bearer credential (required for generation, read per request)
//! - `KASPARRO_PROVIDER_URL`: base URL of the OpenAI-compatible API
//!   (default: https://api.groq.com/openai/v1)
//! - `KASPARRO_PROVIDER_MODEL`: provider model identifier (default: openai/gpt-oss-120b)
//! - `KASPARRO_PROVIDER_TIMEOUT_SECS`: optional timeout for the outbound call

use std::time::Duration;

/// Environment variable holding the provider credential
pub const API_KEY_ENV_VAR: &str = "GROQ_API_KEY";

pub const DEFAULT_PROVIDER_URL: &str = "https://api.groq.com/openai/v1";

pub const DEFAULT_PROVIDER_MODEL: &str = "openai/gpt-oss-120b";

/// Where the provider credential comes from
///
/// `Env` re-reads the variable on every call so a credential added to the
/// environment is picked up without a restart.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Read from an environment variable at call time
    Env(String),
    /// Fixed value (tests and embedding)
    Static(Option<String>),
}

impl CredentialSource {
    /// Default source: `GROQ_API_KEY`
    pub fn from_env() -> Self {
        Self::Env(API_KEY_ENV_VAR.to_string())
    }

    pub fn fixed(key: &str) -> Self {
        Self::Static(Some(key.to_string()))
    }

    pub fn missing() -> Self {
        Self::Static(None)
    }

    /// Current credential, if present and non-blank
    pub fn api_key(&self) -> Option<String> {
        let key = match self {
            Self::Env(var) => std::env::var(var).ok(),
            Self::Static(key) => key.clone(),
        };
        key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    /// Human-readable name for error messages
    pub fn describe(&self) -> String {
        match self {
            Self::Env(var) => var.clone(),
            Self::Static(_) => "provider API key".to_string(),
        }
    }
}

/// Outbound provider settings
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Option<Duration>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.to_string(),
            model: DEFAULT_PROVIDER_MODEL.to_string(),
            timeout: None,
        }
    }
}

impl ProviderConfig {
    /// Read provider settings from the environment, using defaults for unset values
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = std::env::var("KASPARRO_PROVIDER_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.base_url);
        let model = std::env::var("KASPARRO_PROVIDER_MODEL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.model);
        let timeout = std::env::var("KASPARRO_PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| match s.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    tracing::warn!(value = %s, "Ignoring invalid KASPARRO_PROVIDER_TIMEOUT_SECS");
                    None
                }
            });

        Self {
            base_url,
            model,
            timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_credential() {
        assert_eq!(
            CredentialSource::fixed("gsk_test").api_key().as_deref(),
            Some("gsk_test")
        );
        assert!(!CredentialSource::missing().is_configured());
        assert!(!CredentialSource::Static(Some("   ".into())).is_configured());
    }

    #[test]
    fn test_env_credential_reads_at_call_time() {
        let var = "KASPARRO_TEST_CREDENTIAL_READ_AT_CALL_TIME";
        let source = CredentialSource::Env(var.to_string());
        std::env::remove_var(var);
        assert!(!source.is_configured());

        std::env::set_var(var, "gsk_live");
        assert_eq!(source.api_key().as_deref(), Some("gsk_live"));
        std::env::remove_var(var);
        assert!(!source.is_configured());
    }

    #[test]
    fn test_provider_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.model, "openai/gpt-oss-120b");
        assert!(config.timeout.is_none());
    }
}
