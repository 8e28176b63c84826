//! Prompt library for explanation requests
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/kasparro/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Each prompt file carries YAML frontmatter followed by a `# System` and a
//! `# User` section. Templates use `{{var}}` placeholders and
//! `{{#if var}}...{{/if}}` blocks that are dropped when `var` is missing or empty.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::InsightKind;

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const EXPLAIN_VISIBILITY: &str = include_str!("../../../prompts/explain_visibility.md");
    pub const COMPARE_ENGINES: &str = include_str!("../../../prompts/compare_engines.md");
    pub const RECOMMEND_ACTION: &str = include_str!("../../../prompts/recommend_action.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    ExplainVisibility,
    CompareEngines,
    RecommendAction,
}

impl PromptId {
    /// Get the string identifier for this prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExplainVisibility => "explain_visibility",
            Self::CompareEngines => "compare_engines",
            Self::RecommendAction => "recommend_action",
        }
    }

    /// Get all known prompt IDs
    pub fn all() -> &'static [PromptId] {
        &[
            Self::ExplainVisibility,
            Self::CompareEngines,
            Self::RecommendAction,
        ]
    }

    /// Prompt template used for an insight kind
    pub fn for_insight(kind: InsightKind) -> Self {
        match kind {
            InsightKind::Visibility => Self::ExplainVisibility,
            InsightKind::Comparison => Self::CompareEngines,
            InsightKind::Recommendation => Self::RecommendAction,
        }
    }

    /// Get the default embedded content for this prompt
    fn default_content(&self) -> &'static str {
        match self {
            Self::ExplainVisibility => defaults::EXPLAIN_VISIBILITY,
            Self::CompareEngines => defaults::COMPARE_ENGINES,
            Self::RecommendAction => defaults::RECOMMEND_ACTION,
        }
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    /// Unique identifier
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Metadata from frontmatter
    pub metadata: PromptMetadata,
    /// The prompt content (system + user sections)
    pub content: String,
    /// Whether this came from an override file
    pub is_override: bool,
    /// Path to override file (if any)
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    /// Get the system section of the prompt
    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    /// Get the user section of the prompt
    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// Render the system section (or the whole prompt if it has no sections)
    pub fn render_system(&self, vars: &HashMap<&str, String>) -> Result<String> {
        let system = self.system_section().ok_or_else(|| {
            Error::InvalidData(format!(
                "Prompt '{}' has no # System section",
                self.metadata.id
            ))
        })?;
        Ok(render_template(system, vars))
    }

    /// Render the user section with variables
    pub fn render_user(&self, vars: &HashMap<&str, String>) -> String {
        let template = self.user_section().unwrap_or(&self.content);
        render_template(template, vars)
    }
}

/// Prompt library for loading and caching prompts
#[derive(Debug)]
pub struct PromptLibrary {
    /// Override directory path
    override_dir: Option<PathBuf>,
    /// Cached parsed prompts
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Create a new prompt library with default paths
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with a custom override directory
    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with no override directory (embedded only)
    pub fn embedded_only() -> Self {
        Self {
            override_dir: None,
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by ID, loading from override or default
    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        let override_dir = self.override_dir.as_deref();
        match self.cache.entry(id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let prompt = load_prompt(override_dir, id)?;
                Ok(entry.insert(prompt))
            }
        }
    }

    /// List all prompts with their override status
    pub fn list(&mut self) -> Vec<PromptInfo> {
        PromptId::all()
            .iter()
            .map(|&id| {
                let override_path = self.override_path(id).filter(|p| p.exists());
                let version = self.get(id).map(|p| p.metadata.version).unwrap_or(0);
                PromptInfo {
                    id: id.as_str().to_string(),
                    version,
                    has_override: override_path.is_some(),
                    override_path,
                }
            })
            .collect()
    }

    /// Check if a prompt has an override file
    pub fn has_override(&self, id: PromptId) -> bool {
        self.override_path(id).is_some_and(|p| p.exists())
    }

    /// Get the override directory path
    pub fn override_dir(&self) -> Option<&PathBuf> {
        self.override_dir.as_ref()
    }

    /// Clear the cache (useful after editing override files)
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn override_path(&self, id: PromptId) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|d| d.join(format!("{}.md", id.as_str())))
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Information about a prompt for listing
#[derive(Debug, Clone)]
pub struct PromptInfo {
    /// Prompt identifier
    pub id: String,
    /// Version from metadata
    pub version: u32,
    /// Whether an override exists
    pub has_override: bool,
    /// Path to override file (if exists)
    pub override_path: Option<PathBuf>,
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("kasparro").join("prompts").join("overrides"))
}

/// Load a prompt (checking override first, then default)
fn load_prompt(override_dir: Option<&Path>, id: PromptId) -> Result<Prompt> {
    if let Some(dir) = override_dir {
        let override_path = dir.join(format!("{}.md", id.as_str()));
        if override_path.exists() {
            let content = fs::read_to_string(&override_path).map_err(|e| {
                Error::InvalidData(format!("Failed to read prompt override: {}", e))
            })?;
            let (metadata, body) = parse_prompt(&content)?;
            tracing::debug!(prompt = id.as_str(), path = %override_path.display(), "Using prompt override");
            return Ok(Prompt {
                metadata,
                content: body,
                is_override: true,
                override_path: Some(override_path),
            });
        }
    }

    let (metadata, body) = parse_prompt(id.default_content())?;
    Ok(Prompt {
        metadata,
        content: body,
        is_override: false,
        override_path: None,
    })
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    let rest = content.strip_prefix("---").ok_or_else(|| {
        Error::InvalidData("Prompt must start with YAML frontmatter (---)".into())
    })?;

    let end = rest.find("---").ok_or_else(|| {
        Error::InvalidData("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::InvalidData(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

/// Extract a section from the prompt content
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];

    // Runs until the next top-level header
    let end = after_header.find("\n# ").unwrap_or(after_header.len());

    Some(after_header[..end].trim())
}

/// Resolve conditional blocks, then substitute `{{var}}` placeholders
///
/// Placeholders are substituted in a single left-to-right scan, so text that
/// came from a value is never scanned again. Unknown placeholders are kept.
fn render_template(template: &str, vars: &HashMap<&str, String>) -> String {
    let resolved = remove_unmatched_conditionals(template, vars);
    let mut result = String::with_capacity(resolved.len());
    let mut rest = resolved.as_str();

    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            result.push_str(&rest[open..]);
            return result;
        };
        let name = &after_open[..close];
        match vars.get(name) {
            Some(value) => result.push_str(value),
            None => result.push_str(&rest[open..open + 2 + close + 2]),
        }
        rest = &after_open[close + 2..];
    }
    result.push_str(rest);
    result
}

/// Remove unmatched conditional blocks from the template
fn remove_unmatched_conditionals(content: &str, vars: &HashMap<&str, String>) -> String {
    let mut result = content.to_string();

    loop {
        let Some(if_start) = result.find("{{#if ") else {
            break;
        };
        let var_start = if_start + 6;
        let Some(var_end) = result[var_start..].find("}}") else {
            break;
        };
        let var_name = &result[var_start..var_start + var_end];
        let block_start = var_start + var_end + 2;

        let Some(endif_pos) = result[block_start..].find("{{/if}}") else {
            break;
        };
        let block_content = &result[block_start..block_start + endif_pos];
        let full_end = block_start + endif_pos + 7;

        let should_include = vars.get(var_name).is_some_and(|v| !v.is_empty());

        result = if should_include {
            format!(
                "{}{}{}",
                &result[..if_start],
                block_content,
                &result[full_end..]
            )
        } else {
            format!("{}{}", &result[..if_start], &result[full_end..])
        };
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_parse_prompt() {
        let content = r#"---
id: test_prompt
version: 1
---

# System
Test system prompt.

# User
Test user prompt with {{variable}}.
"#;

        let (metadata, body) = parse_prompt(content).unwrap();
        assert_eq!(metadata.id, "test_prompt");
        assert_eq!(metadata.version, 1);
        assert!(body.contains("# System"));
        assert!(body.contains("# User"));
    }

    #[test]
    fn test_parse_prompt_requires_frontmatter() {
        assert!(parse_prompt("# System\nHello").is_err());
        assert!(parse_prompt("---\nid: x\nversion: 1\n# User").is_err());
    }

    #[test]
    fn test_extract_section() {
        let content = r#"# System
System content here.

# User
User content here."#;

        assert_eq!(
            extract_section(content, "# System"),
            Some("System content here.")
        );
        assert_eq!(
            extract_section(content, "# User"),
            Some("User content here.")
        );
    }

    #[test]
    fn test_conditional_blocks() {
        let content = "Start{{#if context}}\nContext: {{context}}{{/if}}\nEnd";

        let result = remove_unmatched_conditionals(content, &vars(&[("context", "launch week")]));
        assert!(result.contains("Context: {{context}}"));

        let result = remove_unmatched_conditionals(content, &HashMap::new());
        assert!(!result.contains("Context:"));
        assert!(result.contains("Start"));
        assert!(result.contains("End"));

        let result = remove_unmatched_conditionals(content, &vars(&[("context", "")]));
        assert!(!result.contains("Context:"));
    }

    #[test]
    fn test_values_are_not_reinterpreted_as_template_syntax() {
        let rendered = render_template(
            "Brand: {{brand_name}}{{#if context}} ({{context}}){{/if}}",
            &vars(&[("brand_name", "{{#if context}}Acme")]),
        );
        assert_eq!(rendered, "Brand: {{#if context}}Acme");
    }

    #[test]
    fn test_substituted_placeholders_are_not_expanded() {
        let template = "{{brand_name}} / {{context}} / {{missing}}";
        let values = vars(&[("brand_name", "{{context}}"), ("context", "{{brand_name}}")]);
        for _ in 0..50 {
            assert_eq!(
                render_template(template, &values),
                "{{context}} / {{brand_name}} / {{missing}}"
            );
        }
    }

    #[test]
    fn test_unclosed_placeholder_is_kept() {
        let rendered = render_template("Hi {{brand_name}} {{oops", &vars(&[("brand_name", "Acme")]));
        assert_eq!(rendered, "Hi Acme {{oops");
    }

    #[test]
    fn test_prompt_library_embedded() {
        let mut lib = PromptLibrary::embedded_only();

        for id in PromptId::all() {
            let prompt = lib.get(*id).unwrap();
            assert!(!prompt.is_override);
            assert!(prompt.override_path.is_none());
            assert!(prompt.system_section().unwrap().contains("Kasparro"));
            assert!(prompt.user_section().unwrap().contains("{{brand_name}}"));
        }
    }

    #[test]
    fn test_default_prompts_parse() {
        for id in PromptId::all() {
            let result = parse_prompt(id.default_content());
            assert!(
                result.is_ok(),
                "Failed to parse {}: {:?}",
                id.as_str(),
                result.err()
            );

            let (metadata, _) = result.unwrap();
            assert_eq!(metadata.id, id.as_str(), "Prompt ID mismatch");
        }
    }

    #[test]
    fn test_prompt_for_insight() {
        assert_eq!(
            PromptId::for_insight(InsightKind::Visibility),
            PromptId::ExplainVisibility
        );
        assert_eq!(
            PromptId::for_insight(InsightKind::Comparison),
            PromptId::CompareEngines
        );
        assert_eq!(
            PromptId::for_insight(InsightKind::Recommendation),
            PromptId::RecommendAction
        );
    }

    #[test]
    fn test_override_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("recommend_action.md"),
            "---\nid: recommend_action\nversion: 7\n---\n\n# System\nShort.\n\n# User\nHelp {{brand_name}}.",
        )
        .unwrap();

        let mut lib = PromptLibrary::with_override_dir(dir.path().to_path_buf());
        assert!(lib.has_override(PromptId::RecommendAction));
        assert!(!lib.has_override(PromptId::CompareEngines));

        let prompt = lib.get(PromptId::RecommendAction).unwrap();
        assert!(prompt.is_override);
        assert_eq!(prompt.metadata.version, 7);
        assert_eq!(
            prompt.render_user(&vars(&[("brand_name", "Acme")])),
            "Help Acme."
        );

        let listed = lib.list();
        assert_eq!(listed.len(), 3);
        let recommend = listed.iter().find(|p| p.id == "recommend_action").unwrap();
        assert!(recommend.has_override);
        assert_eq!(recommend.version, 7);
    }
}
