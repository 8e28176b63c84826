//! Kasparro Core Library
//!
//! Shared functionality for the Kasparro AI visibility service:
//! - Explanation service (prompting, provider call, deterministic fallback)
//! - Pluggable chat-completion backends (OpenAI-compatible, mock)
//! - Engine catalog: model profiles, guides and fallback sentences
//! - Prompt library with per-user overrides
//! - Audit module fixtures with load-time validation
//! - HTTP client for a running explanation endpoint

pub mod ai;
pub mod audit;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod explain;
pub mod models;
pub mod prompts;

/// Test utilities including a mock chat-completion server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{ChatBackend, ChatRequest, MockBackend, MockReply, OpenAICompatibleBackend, ProviderClient};
pub use audit::{AuditModuleData, AuditStore, ModuleId, ModuleMetadata, ModuleSummary, ScoreLevel};
pub use catalog::{EngineCatalog, GuideEntry, ModelGuide, ModelProfile};
pub use client::ExplanationClient;
pub use config::{CredentialSource, ProviderConfig};
pub use error::{Error, Result};
pub use explain::ExplanationService;
pub use models::{
    AiEngine, Bucket, ExplanationRequest, ExplanationResponse, HealthStatus, InsightKind,
};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
