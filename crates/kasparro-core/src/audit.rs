//! Audit module fixtures
//!
//! The dashboard shows seven audit modules, each backed by a JSON document.
//! Documents are embedded in the binary and can be replaced from a directory
//! of `<module-id>.json` files. Every document is checked against the schema
//! at load time so bad fixtures fail at startup rather than in the UI.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Navigation metadata for all modules
const MODULES_JSON: &str = include_str!("../../../data/modules.json");

/// Embedded audit documents, in navigation order
mod fixtures {
    pub const CONTENT_QUALITY: &str = include_str!("../../../data/audit-data/content-quality.json");
    pub const TECHNICAL_SEO: &str = include_str!("../../../data/audit-data/technical-seo.json");
    pub const AI_VISIBILITY: &str = include_str!("../../../data/audit-data/ai-visibility.json");
    pub const KEYWORD_COVERAGE: &str =
        include_str!("../../../data/audit-data/keyword-coverage.json");
    pub const COMPETITOR_ANALYSIS: &str =
        include_str!("../../../data/audit-data/competitor-analysis.json");
    pub const CITATION_NETWORK: &str =
        include_str!("../../../data/audit-data/citation-network.json");
    pub const TRUST_SIGNALS: &str = include_str!("../../../data/audit-data/trust-signals.json");
}

/// Audit module identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleId {
    ContentQuality,
    TechnicalSeo,
    AiVisibility,
    KeywordCoverage,
    CompetitorAnalysis,
    CitationNetwork,
    TrustSignals,
}

impl ModuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleId::ContentQuality => "content-quality",
            ModuleId::TechnicalSeo => "technical-seo",
            ModuleId::AiVisibility => "ai-visibility",
            ModuleId::KeywordCoverage => "keyword-coverage",
            ModuleId::CompetitorAnalysis => "competitor-analysis",
            ModuleId::CitationNetwork => "citation-network",
            ModuleId::TrustSignals => "trust-signals",
        }
    }

    pub fn all() -> &'static [ModuleId] {
        &[
            ModuleId::ContentQuality,
            ModuleId::TechnicalSeo,
            ModuleId::AiVisibility,
            ModuleId::KeywordCoverage,
            ModuleId::CompetitorAnalysis,
            ModuleId::CitationNetwork,
            ModuleId::TrustSignals,
        ]
    }

    /// File name of this module's document
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }

    fn embedded_fixture(&self) -> &'static str {
        match self {
            ModuleId::ContentQuality => fixtures::CONTENT_QUALITY,
            ModuleId::TechnicalSeo => fixtures::TECHNICAL_SEO,
            ModuleId::AiVisibility => fixtures::AI_VISIBILITY,
            ModuleId::KeywordCoverage => fixtures::KEYWORD_COVERAGE,
            ModuleId::CompetitorAnalysis => fixtures::COMPETITOR_ANALYSIS,
            ModuleId::CitationNetwork => fixtures::CITATION_NETWORK,
            ModuleId::TrustSignals => fixtures::TRUST_SIGNALS,
        }
    }
}

impl FromStr for ModuleId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ModuleId::all()
            .iter()
            .find(|id| id.as_str() == s)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("Unknown audit module: {}", s)))
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTrend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Success,
    Warning,
    Critical,
}

/// Shared low/medium/high scale for severity, effort and impact
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

/// Key positive or negative finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Insight {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: InsightType,
}

/// Problem that needs attention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Issue {
    pub id: String,
    pub severity: Level,
    pub message: String,
    pub impact: String,
}

/// Actionable next step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recommendation {
    pub title: String,
    pub effort: Level,
    pub impact: Level,
    pub action: String,
}

/// One audit module document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuditModuleData {
    pub module_id: ModuleId,
    pub brand_id: String,
    pub timestamp: DateTime<Utc>,
    /// 0-100
    pub overall_score: u32,
    pub score_trend: ScoreTrend,
    pub insights: Vec<Insight>,
    pub issues: Vec<Issue>,
    pub recommendations: Vec<Recommendation>,
}

impl AuditModuleData {
    pub fn score_level(&self) -> ScoreLevel {
        ScoreLevel::from_score(self.overall_score)
    }

    /// Check the document beyond what the schema enforces
    fn validate(&self, expected: ModuleId) -> Result<()> {
        if self.module_id != expected {
            return Err(Error::InvalidData(format!(
                "Audit document for {} declares moduleId {}",
                expected, self.module_id
            )));
        }
        if self.overall_score > 100 {
            return Err(Error::InvalidData(format!(
                "{}: overallScore {} is outside 0-100",
                expected, self.overall_score
            )));
        }

        let mut seen = HashSet::new();
        for issue in &self.issues {
            if !seen.insert(issue.id.as_str()) {
                return Err(Error::InvalidData(format!(
                    "{}: duplicate issue id {}",
                    expected, issue.id
                )));
            }
        }

        let titles = self
            .insights
            .iter()
            .map(|i| i.title.as_str())
            .chain(self.recommendations.iter().map(|r| r.title.as_str()));
        if titles.into_iter().any(|t| t.trim().is_empty()) {
            return Err(Error::InvalidData(format!("{}: empty title", expected)));
        }

        Ok(())
    }
}

/// Navigation metadata for a module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModuleMetadata {
    pub id: ModuleId,
    pub name: String,
    pub short_name: String,
    pub description: String,
    /// Lucide icon name
    pub icon: String,
}

/// Score classification used for coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreLevel {
    Excellent,
    Good,
    Average,
    Poor,
}

impl ScoreLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 80 => ScoreLevel::Excellent,
            s if s >= 60 => ScoreLevel::Good,
            s if s >= 40 => ScoreLevel::Average,
            _ => ScoreLevel::Poor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreLevel::Excellent => "excellent",
            ScoreLevel::Good => "good",
            ScoreLevel::Average => "average",
            ScoreLevel::Poor => "poor",
        }
    }
}

/// One row of the audit overview
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSummary {
    pub module_id: ModuleId,
    pub name: String,
    pub overall_score: u32,
    pub level: ScoreLevel,
    pub score_trend: ScoreTrend,
    pub critical_insights: usize,
    pub high_severity_issues: usize,
}

/// Validated set of audit documents
#[derive(Debug, Clone)]
pub struct AuditStore {
    modules: Vec<ModuleMetadata>,
    data: BTreeMap<ModuleId, AuditModuleData>,
    source: Option<PathBuf>,
}

impl AuditStore {
    /// Load the documents bundled with the binary
    pub fn embedded() -> Result<Self> {
        let modules = parse_modules(MODULES_JSON)?;
        let mut data = BTreeMap::new();
        for id in ModuleId::all() {
            data.insert(*id, parse_module(*id, id.embedded_fixture())?);
        }
        Ok(Self {
            modules,
            data,
            source: None,
        })
    }

    /// Load documents from a directory
    ///
    /// Files that are absent fall back to the embedded document; files that
    /// are present must be valid.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::NotFound(format!(
                "Audit data directory not found: {}",
                dir.display()
            )));
        }

        let mut store = Self::embedded()?;

        let modules_path = dir.join("modules.json");
        if modules_path.exists() {
            store.modules = parse_modules(&fs::read_to_string(&modules_path)?)?;
        }

        for id in ModuleId::all() {
            let path = dir.join(id.file_name());
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                store.data.insert(*id, parse_module(*id, &content)?);
                debug!(module = %id, path = %path.display(), "Loaded audit document");
            }
        }

        info!(dir = %dir.display(), "Loaded audit data");
        store.source = Some(dir.to_path_buf());
        Ok(store)
    }

    /// Directory the store was loaded from (`None` for embedded data)
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn modules(&self) -> &[ModuleMetadata] {
        &self.modules
    }

    pub fn get(&self, id: ModuleId) -> Option<&AuditModuleData> {
        self.data.get(&id)
    }

    /// Per-module overview in navigation order
    pub fn summary(&self) -> Vec<ModuleSummary> {
        self.modules
            .iter()
            .filter_map(|meta| {
                let data = self.data.get(&meta.id)?;
                Some(ModuleSummary {
                    module_id: meta.id,
                    name: meta.name.clone(),
                    overall_score: data.overall_score,
                    level: data.score_level(),
                    score_trend: data.score_trend,
                    critical_insights: data
                        .insights
                        .iter()
                        .filter(|i| i.kind == InsightType::Critical)
                        .count(),
                    high_severity_issues: data
                        .issues
                        .iter()
                        .filter(|i| i.severity == Level::High)
                        .count(),
                })
            })
            .collect()
    }
}

fn parse_module(id: ModuleId, content: &str) -> Result<AuditModuleData> {
    let data: AuditModuleData = serde_json::from_str(content)
        .map_err(|e| Error::InvalidData(format!("{}: {}", id.file_name(), e)))?;
    data.validate(id)?;
    Ok(data)
}

fn parse_modules(content: &str) -> Result<Vec<ModuleMetadata>> {
    let modules: Vec<ModuleMetadata> = serde_json::from_str(content)
        .map_err(|e| Error::InvalidData(format!("modules.json: {}", e)))?;

    let ids: HashSet<ModuleId> = modules.iter().map(|m| m.id).collect();
    if ids.len() != modules.len() || ids.len() != ModuleId::all().len() {
        return Err(Error::InvalidData(
            "modules.json must list every audit module exactly once".to_string(),
        ));
    }
    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_store_loads_every_module() {
        let store = AuditStore::embedded().unwrap();
        assert_eq!(store.modules().len(), 7);
        for id in ModuleId::all() {
            let data = store.get(*id).unwrap();
            assert_eq!(data.module_id, *id);
            assert!(data.overall_score <= 100);
        }
        assert_eq!(store.modules()[0].id, ModuleId::ContentQuality);
        assert!(store.source().is_none());
    }

    #[test]
    fn test_score_level_boundaries() {
        assert_eq!(ScoreLevel::from_score(100), ScoreLevel::Excellent);
        assert_eq!(ScoreLevel::from_score(80), ScoreLevel::Excellent);
        assert_eq!(ScoreLevel::from_score(79), ScoreLevel::Good);
        assert_eq!(ScoreLevel::from_score(60), ScoreLevel::Good);
        assert_eq!(ScoreLevel::from_score(40), ScoreLevel::Average);
        assert_eq!(ScoreLevel::from_score(39), ScoreLevel::Poor);
        assert_eq!(ScoreLevel::from_score(0), ScoreLevel::Poor);
    }

    #[test]
    fn test_module_id_parse() {
        assert_eq!(
            "trust-signals".parse::<ModuleId>().unwrap(),
            ModuleId::TrustSignals
        );
        assert!(matches!(
            "backlinks".parse::<ModuleId>(),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_summary_counts() {
        let store = AuditStore::embedded().unwrap();
        let summary = store.summary();
        assert_eq!(summary.len(), 7);

        let technical = summary
            .iter()
            .find(|s| s.module_id == ModuleId::TechnicalSeo)
            .unwrap();
        assert_eq!(technical.overall_score, 64);
        assert_eq!(technical.level, ScoreLevel::Good);
        assert_eq!(technical.critical_insights, 1);
        assert_eq!(technical.high_severity_issues, 1);
    }

    fn fixture(id: ModuleId) -> serde_json::Value {
        serde_json::from_str(id.embedded_fixture()).unwrap()
    }

    #[test]
    fn test_rejects_unknown_field() {
        let mut doc = fixture(ModuleId::AiVisibility);
        doc["extra"] = serde_json::json!(true);
        let err = parse_module(ModuleId::AiVisibility, &doc.to_string()).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_rejects_out_of_range_score() {
        let mut doc = fixture(ModuleId::AiVisibility);
        doc["overallScore"] = serde_json::json!(101);
        assert!(parse_module(ModuleId::AiVisibility, &doc.to_string()).is_err());
    }

    #[test]
    fn test_rejects_mismatched_module_id() {
        let doc = fixture(ModuleId::AiVisibility);
        assert!(parse_module(ModuleId::TrustSignals, &doc.to_string()).is_err());
    }

    #[test]
    fn test_rejects_duplicate_issue_ids() {
        let mut doc = fixture(ModuleId::TechnicalSeo);
        doc["issues"][1]["id"] = doc["issues"][0]["id"].clone();
        assert!(parse_module(ModuleId::TechnicalSeo, &doc.to_string()).is_err());
    }

    #[test]
    fn test_rejects_empty_title() {
        let mut doc = fixture(ModuleId::TrustSignals);
        doc["recommendations"][0]["title"] = serde_json::json!("  ");
        assert!(parse_module(ModuleId::TrustSignals, &doc.to_string()).is_err());
    }

    #[test]
    fn test_load_dir_overrides_single_module() {
        let temp = TempDir::new().unwrap();
        let mut doc = fixture(ModuleId::AiVisibility);
        doc["overallScore"] = serde_json::json!(91);
        fs::write(temp.path().join("ai-visibility.json"), doc.to_string()).unwrap();

        let store = AuditStore::load_dir(temp.path()).unwrap();
        assert_eq!(store.get(ModuleId::AiVisibility).unwrap().overall_score, 91);
        assert_eq!(
            store.get(ModuleId::TrustSignals).unwrap().overall_score,
            AuditStore::embedded()
                .unwrap()
                .get(ModuleId::TrustSignals)
                .unwrap()
                .overall_score
        );
        assert_eq!(store.source(), Some(temp.path()));
    }

    #[test]
    fn test_load_dir_rejects_invalid_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("content-quality.json"), "{}").unwrap();
        assert!(AuditStore::load_dir(temp.path()).is_err());
    }

    #[test]
    fn test_load_dir_missing_directory() {
        assert!(matches!(
            AuditStore::load_dir(Path::new("/nonexistent/kasparro-audit")),
            Err(Error::NotFound(_))
        ));
    }
}
