//! Chat-completion request types
//!
//! These types are backend-agnostic and used across all provider implementations.

/// Sampling temperature sent with every explanation request
pub const TEMPERATURE: f32 = 0.7;

/// Maximum number of generated tokens
pub const MAX_TOKENS: u32 = 300;

/// Nucleus-sampling threshold
pub const TOP_P: f32 = 0.9;

/// A two-message conversation: fixed system instruction plus the rendered user prompt
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
}

impl ChatRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Provider connection details for display
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    /// Backend kind ("openai_compatible" or "mock")
    pub kind: &'static str,
    pub host: String,
    pub model: String,
}
