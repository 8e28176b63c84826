//! Data models for Kasparro
//!
//! Request/response types for the explanation endpoint plus the small closed
//! enums (insight kinds, AI engines, fallback buckets) they are built from.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Model identifier echoed when the request names no engine
pub const GENERAL_MODEL: &str = "general";

/// Explanation text used when the provider returns no message content
pub const PLACEHOLDER_EXPLANATION: &str = "Unable to generate explanation";

/// Service name reported by the health check
pub const SERVICE_NAME: &str = "ai-explanations";

// ============================================================================
// Insight kinds
// ============================================================================

/// Category of explanation requested; selects the prompt template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    /// Why a brand has a given visibility score in one engine
    Visibility,
    /// How the engines differ in perceiving a brand
    Comparison,
    /// One concrete action to improve a metric
    Recommendation,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visibility => "visibility",
            Self::Comparison => "comparison",
            Self::Recommendation => "recommendation",
        }
    }

    pub fn all() -> &'static [InsightKind] {
        &[Self::Visibility, Self::Comparison, Self::Recommendation]
    }
}

impl FromStr for InsightKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "visibility" => Ok(Self::Visibility),
            "comparison" => Ok(Self::Comparison),
            "recommendation" => Ok(Self::Recommendation),
            other => Err(Error::Validation(format!(
                "Invalid insight type: '{}' (expected visibility, comparison or recommendation)",
                other
            ))),
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// AI engines
// ============================================================================

/// AI engines whose brand visibility is explained
///
/// Ordering follows declaration order, which is also the order engines are
/// listed in health checks and the model guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiEngine {
    #[serde(rename = "chatgpt")]
    ChatGpt,
    Gemini,
    Perplexity,
    Claude,
}

impl AiEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChatGpt => "chatgpt",
            Self::Gemini => "gemini",
            Self::Perplexity => "perplexity",
            Self::Claude => "claude",
        }
    }

    pub fn all() -> &'static [AiEngine] {
        &[Self::ChatGpt, Self::Gemini, Self::Perplexity, Self::Claude]
    }

    /// Parse an engine identifier (case-insensitive, surrounding whitespace ignored)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "chatgpt" => Some(Self::ChatGpt),
            "gemini" => Some(Self::Gemini),
            "perplexity" => Some(Self::Perplexity),
            "claude" => Some(Self::Claude),
            _ => None,
        }
    }
}

impl fmt::Display for AiEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Fallback buckets
// ============================================================================

/// Three-way classification of a visibility value for fallback lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    High,
    Medium,
    Low,
}

impl Bucket {
    /// Bucket thresholds: high >= 60, medium >= 35, low otherwise
    pub fn from_value(value: f64) -> Self {
        if value >= 60.0 {
            Self::High
        } else if value >= 35.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

// ============================================================================
// Explanation request / response
// ============================================================================

/// Insight descriptor sent by the dashboard
///
/// `insight_type` is kept as the raw wire string so an unknown value reaches
/// validation (and gets a 400) instead of failing JSON decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationRequest {
    #[serde(default)]
    pub insight_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub brand_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ExplanationRequest {
    pub fn new(kind: InsightKind, brand_name: &str) -> Self {
        Self {
            insight_type: kind.as_str().to_string(),
            brand_name: brand_name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_metric(mut self, metric: &str) -> Self {
        self.metric = Some(metric.to_string());
        self
    }

    pub fn with_context(mut self, context: &str) -> Self {
        self.context = Some(context.to_string());
        self
    }

    /// Parse the insight type
    pub fn insight_kind(&self) -> Result<InsightKind> {
        self.insight_type.parse()
    }

    /// Model string if present and non-blank
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }

    /// Recognized engine named by `model`, if any
    pub fn engine(&self) -> Option<AiEngine> {
        self.model_name().and_then(AiEngine::parse)
    }

    /// Model identifier to echo in the response
    pub fn resolved_model(&self) -> &str {
        self.model_name().unwrap_or(GENERAL_MODEL)
    }

    /// Check the request preconditions and return its insight kind
    pub fn validate(&self) -> Result<InsightKind> {
        let kind = self.insight_kind()?;

        if self.brand_name.trim().is_empty() {
            return Err(Error::Validation("brandName is required".into()));
        }

        if kind == InsightKind::Visibility && self.model_name().is_none() {
            return Err(Error::Validation(
                "model is required for visibility insights".into(),
            ));
        }

        Ok(kind)
    }
}

/// Explanation returned to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationResponse {
    /// True only when the provider call completed
    pub success: bool,
    /// Generated or fallback text, never empty
    pub explanation: String,
    pub model: String,
    pub insight_type: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExplanationResponse {
    /// Response for a completed provider call
    pub fn generated(request: &ExplanationRequest, explanation: String) -> Self {
        Self {
            success: true,
            explanation,
            model: request.resolved_model().to_string(),
            insight_type: request.insight_type.clone(),
            generated_at: Utc::now(),
            error: None,
        }
    }

    /// Degraded response carrying fallback text and the failure detail
    pub fn degraded(request: &ExplanationRequest, explanation: String, error: String) -> Self {
        Self {
            success: false,
            explanation,
            model: request.resolved_model().to_string(),
            insight_type: request.insight_type.clone(),
            generated_at: Utc::now(),
            error: Some(error),
        }
    }
}

/// Health check payload for the explanation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub provider_configured: bool,
    pub available_models: Vec<String>,
}
