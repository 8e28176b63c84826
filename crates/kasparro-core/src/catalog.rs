//! Engine catalog: static model profiles, model guides and fallback text
//!
//! ## Configuration Resolution
//!
//! The catalog is loaded with a two-layer resolution:
//! 1. `KASPARRO_ENGINE_CATALOG` points at a TOML file that replaces the defaults
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! The catalog is validated at load time and never mutated afterwards.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{AiEngine, Bucket, ExplanationRequest, ExplanationResponse};

/// Embedded default catalog (compiled into binary)
const DEFAULT_CATALOG: &str = include_str!("../../../config/engines.toml");

/// Environment variable naming a replacement catalog file
pub const CATALOG_ENV_VAR: &str = "KASPARRO_ENGINE_CATALOG";

/// Descriptive metadata about one AI engine, used to enrich prompts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ModelProfile {
    pub name: String,
    pub strengths: String,
    pub data_source: String,
    pub citation_style: String,
    pub brand_preference: String,
}

/// Example query showing how an engine typically behaves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuideExample {
    pub query: String,
    pub behavior: String,
}

/// User-facing description of an AI engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ModelGuide {
    pub name: String,
    /// Lucide icon name
    pub icon: String,
    /// Brand color (hex)
    pub color: String,
    pub description: String,
    pub how_it_works: String,
    pub example: GuideExample,
    #[serde(default)]
    pub optimization_tips: Vec<String>,
}

/// A model guide paired with its engine id, as served to the UI
#[derive(Debug, Clone, Serialize)]
pub struct GuideEntry {
    pub id: AiEngine,
    #[serde(flatten)]
    pub guide: ModelGuide,
}

/// Pre-written fallback explanations for one engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FallbackRow {
    pub high: String,
    pub medium: String,
    pub low: String,
}

impl FallbackRow {
    pub fn get(&self, bucket: Bucket) -> &str {
        match bucket {
            Bucket::High => &self.high,
            Bucket::Medium => &self.medium,
            Bucket::Low => &self.low,
        }
    }
}

/// On-disk catalog layout
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    generic_fallback: String,
    #[serde(default)]
    profiles: BTreeMap<String, ModelProfile>,
    #[serde(default)]
    guides: BTreeMap<String, ModelGuide>,
    #[serde(default)]
    fallback: BTreeMap<String, FallbackRow>,
}

/// Validated, immutable engine catalog
#[derive(Debug, Clone)]
pub struct EngineCatalog {
    generic_fallback: String,
    profiles: BTreeMap<AiEngine, ModelProfile>,
    guides: BTreeMap<AiEngine, ModelGuide>,
    fallback: BTreeMap<AiEngine, FallbackRow>,
    /// The `chatgpt` row, used for engines without their own row
    default_fallback: FallbackRow,
    source: Option<PathBuf>,
}

impl EngineCatalog {
    /// Load the embedded default catalog
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(DEFAULT_CATALOG)
    }

    /// Load a catalog from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::InvalidData(format!(
                "Failed to read engine catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        let mut catalog = Self::from_toml_str(&content)?;
        catalog.source = Some(path.to_path_buf());
        Ok(catalog)
    }

    /// Load from `KASPARRO_ENGINE_CATALOG` if set, otherwise the embedded default
    pub fn from_env() -> Result<Self> {
        match std::env::var(CATALOG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => {
                let catalog = Self::load(Path::new(path.trim()))?;
                tracing::info!(path = %path, "Loaded engine catalog override");
                Ok(catalog)
            }
            _ => Self::embedded(),
        }
    }

    /// Parse and validate a catalog document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;

        let profiles = keyed_by_engine("profiles", file.profiles)?;
        let guides = keyed_by_engine("guides", file.guides)?;
        let fallback = keyed_by_engine("fallback", file.fallback)?;
        validate(&file.generic_fallback, &profiles, &guides, &fallback)?;

        let default_fallback = fallback
            .get(&AiEngine::ChatGpt)
            .cloned()
            .ok_or_else(|| Error::InvalidData("Catalog must define [fallback.chatgpt]".into()))?;

        Ok(Self {
            generic_fallback: file.generic_fallback,
            profiles,
            guides,
            fallback,
            default_fallback,
            source: None,
        })
    }

    /// Path of the override file, if the catalog was loaded from one
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn profile(&self, engine: AiEngine) -> Option<&ModelProfile> {
        self.profiles.get(&engine)
    }

    pub fn guide(&self, engine: AiEngine) -> Option<&ModelGuide> {
        self.guides.get(&engine)
    }

    /// All guides in engine order
    pub fn guides(&self) -> Vec<GuideEntry> {
        self.guides
            .iter()
            .map(|(id, guide)| GuideEntry {
                id: *id,
                guide: guide.clone(),
            })
            .collect()
    }

    /// Guide for one engine, tagged with its id
    pub fn guide_entry(&self, engine: AiEngine) -> Option<GuideEntry> {
        self.guide(engine).map(|guide| GuideEntry {
            id: engine,
            guide: guide.clone(),
        })
    }

    /// Engine ids that have a profile, in engine order
    pub fn available_models(&self) -> Vec<String> {
        self.profiles.keys().map(|e| e.as_str().to_string()).collect()
    }

    pub fn generic_fallback(&self) -> &str {
        &self.generic_fallback
    }

    /// Deterministic fallback text for a model/value pair
    ///
    /// Without a model or a value the generic cross-model sentence is used.
    /// Models without their own row (including unrecognized ones) use the
    /// `chatgpt` row.
    pub fn fallback_explanation(&self, model: Option<&str>, value: Option<f64>) -> &str {
        let model = model.map(str::trim).filter(|m| !m.is_empty());
        let (Some(model), Some(value)) = (model, value) else {
            return &self.generic_fallback;
        };

        let bucket = Bucket::from_value(value);
        AiEngine::parse(model)
            .and_then(|engine| self.fallback.get(&engine))
            .unwrap_or(&self.default_fallback)
            .get(bucket)
    }

    /// Degraded response for a request whose explanation could not be generated
    pub fn fallback_response(
        &self,
        request: &ExplanationRequest,
        detail: impl std::fmt::Display,
    ) -> ExplanationResponse {
        let explanation = self
            .fallback_explanation(request.model.as_deref(), request.value)
            .to_string();
        ExplanationResponse::degraded(request, explanation, detail.to_string())
    }
}

/// Re-key a table by engine, rejecting unknown engine names
fn keyed_by_engine<T>(
    section: &str,
    table: BTreeMap<String, T>,
) -> Result<BTreeMap<AiEngine, T>> {
    table
        .into_iter()
        .map(|(key, value)| {
            AiEngine::parse(&key)
                .map(|engine| (engine, value))
                .ok_or_else(|| {
                    Error::InvalidData(format!("Unknown engine in [{}.{}]", section, key))
                })
        })
        .collect()
}

/// Reject catalogs with missing engines or empty text
fn validate(
    generic_fallback: &str,
    profiles: &BTreeMap<AiEngine, ModelProfile>,
    guides: &BTreeMap<AiEngine, ModelGuide>,
    fallback: &BTreeMap<AiEngine, FallbackRow>,
) -> Result<()> {
    if generic_fallback.trim().is_empty() {
        return Err(Error::InvalidData("generic_fallback must not be empty".into()));
    }

    for engine in AiEngine::all() {
        let profile = profiles.get(engine).ok_or_else(|| {
            Error::InvalidData(format!("Catalog is missing [profiles.{}]", engine))
        })?;
        for (field, text) in [
            ("name", &profile.name),
            ("strengths", &profile.strengths),
            ("data_source", &profile.data_source),
            ("citation_style", &profile.citation_style),
            ("brand_preference", &profile.brand_preference),
        ] {
            if text.trim().is_empty() {
                return Err(Error::InvalidData(format!(
                    "profiles.{}.{} must not be empty",
                    engine, field
                )));
            }
        }

        let guide = guides.get(engine).ok_or_else(|| {
            Error::InvalidData(format!("Catalog is missing [guides.{}]", engine))
        })?;
        if guide.name.trim().is_empty() || guide.description.trim().is_empty() {
            return Err(Error::InvalidData(format!(
                "guides.{} needs a name and description",
                engine
            )));
        }
    }

    for (engine, row) in fallback {
        for bucket in [Bucket::High, Bucket::Medium, Bucket::Low] {
            if row.get(bucket).trim().is_empty() {
                return Err(Error::InvalidData(format!(
                    "fallback.{}.{} must not be empty",
                    engine,
                    bucket.as_str()
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InsightKind;

    fn catalog() -> EngineCatalog {
        EngineCatalog::embedded().unwrap()
    }

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = catalog();
        assert!(catalog.source().is_none());
        assert_eq!(
            catalog.available_models(),
            vec!["chatgpt", "gemini", "perplexity", "claude"]
        );
        for engine in AiEngine::all() {
            assert!(catalog.profile(*engine).is_some());
            assert!(catalog.guide(*engine).is_some());
        }
    }

    #[test]
    fn test_profile_contents() {
        let gemini = catalog().profile(AiEngine::Gemini).cloned().unwrap();
        assert_eq!(gemini.name, "Gemini (Google)");
        assert_eq!(gemini.data_source, "Live Google Search + training data");
    }

    #[test]
    fn test_fallback_buckets_for_every_engine() {
        let catalog = catalog();
        for engine in AiEngine::all() {
            let row = catalog
                .fallback
                .get(engine)
                .unwrap_or(&catalog.default_fallback);
            let model = Some(engine.as_str());
            assert_eq!(catalog.fallback_explanation(model, Some(75.0)), row.high);
            assert_eq!(catalog.fallback_explanation(model, Some(50.0)), row.medium);
            assert_eq!(catalog.fallback_explanation(model, Some(10.0)), row.low);
        }
    }

    #[test]
    fn test_fallback_gemini_high() {
        let text = catalog()
            .fallback_explanation(Some("gemini"), Some(72.0))
            .to_string();
        assert_eq!(
            text,
            "Gemini prioritizes your brand because of strong Google ecosystem signals—structured data, Google Business Profile, and authoritative backlinks all contribute to visibility."
        );
    }

    #[test]
    fn test_guide_copy_is_literal() {
        let guide = catalog().guide(AiEngine::Perplexity).unwrap().clone();
        assert_eq!(
            guide.how_it_works,
            "Perplexity is designed for research. It always searches the web and provides numbered citations. Content that can be quoted—statistics, facts, methodologies—gets cited most often."
        );
    }

    #[test]
    fn test_fallback_unknown_model_uses_chatgpt_row() {
        let catalog = catalog();
        assert_eq!(
            catalog.fallback_explanation(Some("copilot"), Some(20.0)),
            catalog.fallback_explanation(Some("chatgpt"), Some(20.0))
        );
        // Claude has a profile but no fallback row of its own
        assert_eq!(
            catalog.fallback_explanation(Some("claude"), Some(90.0)),
            catalog.fallback_explanation(Some("chatgpt"), Some(90.0))
        );
    }

    #[test]
    fn test_fallback_generic_without_model_or_value() {
        let catalog = catalog();
        let generic = catalog.generic_fallback().to_string();
        assert_eq!(catalog.fallback_explanation(None, Some(80.0)), generic);
        assert_eq!(catalog.fallback_explanation(Some("gemini"), None), generic);
        assert_eq!(catalog.fallback_explanation(Some("  "), Some(80.0)), generic);
        assert!(generic.starts_with("AI models differ"));
    }

    #[test]
    fn test_fallback_response_shape() {
        let request = ExplanationRequest::new(InsightKind::Visibility, "Acme")
            .with_model("gemini")
            .with_value(72.0);
        let response = catalog().fallback_response(&request, "connection refused");
        assert!(!response.success);
        assert_eq!(response.model, "gemini");
        assert_eq!(response.insight_type, "visibility");
        assert_eq!(response.error.as_deref(), Some("connection refused"));
        assert!(!response.explanation.is_empty());
    }

    #[test]
    fn test_guides_serialize_with_id() {
        let catalog = catalog();
        let json = serde_json::to_value(catalog.guides()).unwrap();
        let guides = json.as_array().unwrap();
        assert_eq!(guides.len(), 4);
        assert_eq!(guides[0]["id"], "chatgpt");
        assert_eq!(guides[0]["color"], "#10a37f");
        assert!(guides[0]["howItWorks"].is_string());
        assert_eq!(guides[0]["optimizationTips"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_missing_chatgpt_fallback_rejected() {
        let content = DEFAULT_CATALOG.replace("[fallback.chatgpt]", "[fallback.claude]");
        let err = EngineCatalog::from_toml_str(&content).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_unknown_engine_rejected() {
        let content = format!(
            "{}\n[fallback.copilot]\nhigh = \"a\"\nmedium = \"b\"\nlow = \"c\"\n",
            DEFAULT_CATALOG
        );
        assert!(matches!(
            EngineCatalog::from_toml_str(&content),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_empty_sentence_rejected() {
        let sentence = catalog().fallback_explanation(Some("gemini"), Some(90.0)).to_string();
        let content = DEFAULT_CATALOG.replace(&sentence, "   ");
        assert!(matches!(
            EngineCatalog::from_toml_str(&content),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_load_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engines.toml");
        let content = DEFAULT_CATALOG.replace(
            "AI models differ in how they surface brand information.",
            "Engines disagree.",
        );
        fs::write(&path, content).unwrap();

        let catalog = EngineCatalog::load(&path).unwrap();
        assert_eq!(catalog.source(), Some(path.as_path()));
        assert!(catalog.generic_fallback().starts_with("Engines disagree."));
    }
}
