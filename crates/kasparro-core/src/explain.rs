//! Explanation service
//!
//! Turns an [`ExplanationRequest`] into a prompt, runs one provider
//! completion and shapes the [`ExplanationResponse`]. Validation and missing
//! credentials are reported as errors before any outbound call; everything
//! after that point degrades to the catalog's fallback text.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::ai::{ChatBackend, ChatRequest, ProviderClient};
use crate::catalog::EngineCatalog;
use crate::config::CredentialSource;
use crate::error::{Error, Result};
use crate::models::{
    AiEngine, ExplanationRequest, ExplanationResponse, HealthStatus, InsightKind,
    PLACEHOLDER_EXPLANATION, SERVICE_NAME,
};
use crate::prompts::{PromptId, PromptLibrary};

/// Placeholder for optional numeric or metric fields the caller left out
const UNKNOWN: &str = "unknown";

/// Generates AI visibility explanations
#[derive(Clone)]
pub struct ExplanationService {
    backend: ProviderClient,
    credential: CredentialSource,
    catalog: Arc<EngineCatalog>,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl ExplanationService {
    /// Create a service using the embedded prompts only
    pub fn new(backend: ProviderClient, credential: CredentialSource, catalog: EngineCatalog) -> Self {
        Self {
            backend,
            credential,
            catalog: Arc::new(catalog),
            prompts: Arc::new(RwLock::new(PromptLibrary::embedded_only())),
        }
    }

    /// Replace the prompt library (e.g. one with an override directory)
    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = Arc::new(RwLock::new(prompts));
        self
    }

    /// Build from the process environment
    ///
    /// Provider settings, credential variable, catalog override and the
    /// per-user prompt override directory are all resolved here.
    pub fn from_env() -> Result<Self> {
        let backend = ProviderClient::from_env()?;
        let catalog = EngineCatalog::from_env()?;
        let info = backend.info();
        info!(
            backend = info.kind,
            host = %info.host,
            model = %info.model,
            "Explanation provider configured"
        );
        Ok(Self::new(backend, CredentialSource::from_env(), catalog)
            .with_prompts(PromptLibrary::new()))
    }

    pub fn catalog(&self) -> &EngineCatalog {
        &self.catalog
    }

    pub fn backend(&self) -> &ProviderClient {
        &self.backend
    }

    pub fn credential(&self) -> &CredentialSource {
        &self.credential
    }

    /// Health report; reads the credential at call time and never contacts the provider
    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            service: SERVICE_NAME.to_string(),
            provider_configured: self.credential.is_configured(),
            available_models: self.catalog.available_models(),
        }
    }

    /// Generate an explanation, degrading to fallback text on provider failure
    ///
    /// Only validation and configuration problems are returned as `Err`.
    pub async fn generate_explanation(
        &self,
        request: &ExplanationRequest,
    ) -> Result<ExplanationResponse> {
        match self.try_generate(request).await {
            Ok(response) => Ok(response),
            Err(e) if e.is_precondition() => Err(e),
            Err(e) => Ok(self.fallback_response(request, &e)),
        }
    }

    /// Generate an explanation, returning provider failures as errors
    pub async fn try_generate(&self, request: &ExplanationRequest) -> Result<ExplanationResponse> {
        let kind = request.validate()?;
        let api_key = self.credential.api_key().ok_or_else(|| {
            Error::Configuration("Groq API key not configured".to_string())
        })?;

        let chat = self.build_prompt(kind, request)?;
        debug!(
            insight_type = %kind,
            model = request.resolved_model(),
            prompt = %chat.user,
            "Requesting explanation"
        );

        let text = self.backend.complete(&api_key, &chat).await?;
        debug!(has_content = text.is_some(), "Provider replied");

        let explanation = text.unwrap_or_else(|| PLACEHOLDER_EXPLANATION.to_string());
        Ok(ExplanationResponse::generated(request, explanation))
    }

    /// Degraded response for `request`, logging the failure
    pub fn fallback_response(
        &self,
        request: &ExplanationRequest,
        error: impl std::fmt::Display,
    ) -> ExplanationResponse {
        warn!(
            insight_type = %request.insight_type,
            model = request.resolved_model(),
            error = %error,
            "Explanation generation failed, using fallback"
        );
        self.catalog.fallback_response(request, error)
    }

    /// Render the system instruction and user prompt for a request
    pub fn build_prompt(&self, kind: InsightKind, request: &ExplanationRequest) -> Result<ChatRequest> {
        let vars = self.prompt_vars(kind, request);

        let mut library = self
            .prompts
            .write()
            .map_err(|_| Error::InvalidData("Prompt library lock poisoned".to_string()))?;
        let prompt = library.get(PromptId::for_insight(kind))?;

        Ok(ChatRequest::new(
            prompt.render_system(&vars)?,
            prompt.render_user(&vars),
        ))
    }

    fn prompt_vars(&self, kind: InsightKind, request: &ExplanationRequest) -> HashMap<&'static str, String> {
        let mut vars = HashMap::new();
        vars.insert("brand_name", request.brand_name.trim().to_string());
        vars.insert(
            "value",
            request
                .value
                .map(|v| v.to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
        );
        vars.insert(
            "metric",
            request
                .metric
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(UNKNOWN)
                .to_string(),
        );
        if let Some(context) = request.context.as_deref().map(str::trim) {
            vars.insert("context", context.to_string());
        }

        match kind {
            InsightKind::Visibility => {
                let profile = request.engine().and_then(|e| self.catalog.profile(e));
                let engine_name = profile
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| request.resolved_model().to_string());
                vars.insert("engine_name", engine_name);
                if let Some(profile) = profile {
                    vars.insert("strengths", profile.strengths.clone());
                    vars.insert("data_source", profile.data_source.clone());
                    vars.insert("citation_style", profile.citation_style.clone());
                    vars.insert("brand_preference", profile.brand_preference.clone());
                }
            }
            InsightKind::Comparison => {
                for (engine, key) in [
                    (AiEngine::ChatGpt, "chatgpt_preference"),
                    (AiEngine::Gemini, "gemini_preference"),
                    (AiEngine::Perplexity, "perplexity_preference"),
                ] {
                    let preference = self
                        .catalog
                        .profile(engine)
                        .map(|p| p.brand_preference.clone())
                        .unwrap_or_default();
                    vars.insert(key, preference);
                }
            }
            InsightKind::Recommendation => {}
        }

        vars
    }
}
