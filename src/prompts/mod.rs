//! Commit message styles and prompt templates.
//!
//! Templates live in an embedded YAML catalog and are rendered by
//! substituting the staged file list and the fitted diff. Each style
//! carries an estimated prompt overhead in tokens, which the budget
//! calculator subtracts from the context window.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use anyhow::{anyhow, Result};
use serde::Deserialize;

/// Prompt overhead assumed for styles missing an explicit estimate.
const DEFAULT_PROMPT_OVERHEAD: usize = 700;

/// Commit message style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStyle {
    /// Conventional-commit subject with optional short body.
    Conventional,
    /// Subject plus a body explaining what and why.
    Detailed,
    /// One short subject line.
    Simple,
}

impl CommitStyle {
    /// Template name as it appears in the catalog and on the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conventional => "commit_conventional",
            Self::Detailed => "commit_detailed",
            Self::Simple => "commit_simple",
        }
    }

    /// Estimated rendered-prompt size in tokens, excluding the diff.
    pub fn prompt_overhead(self) -> usize {
        prompt_catalog()
            .templates
            .get(self.as_str())
            .map_or(DEFAULT_PROMPT_OVERHEAD, |t| t.overhead_tokens)
    }

    /// All styles, for CLI help output.
    pub fn all() -> &'static [CommitStyle] {
        &[Self::Conventional, Self::Detailed, Self::Simple]
    }
}

impl fmt::Display for CommitStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "commit_conventional" | "conventional" => Ok(Self::Conventional),
            "commit_detailed" | "detailed" => Ok(Self::Detailed),
            "commit_simple" | "simple" => Ok(Self::Simple),
            other => Err(anyhow!(
                "unknown commit style '{other}' (expected one of: commit_conventional, commit_detailed, commit_simple)"
            )),
        }
    }
}

/// One template from the catalog.
#[derive(Debug, Deserialize)]
struct PromptTemplate {
    #[allow(dead_code)] // shown by future template-listing output
    display_name: String,
    #[allow(dead_code)]
    description: String,
    overhead_tokens: usize,
    system: String,
    template: String,
}

#[derive(Debug, Deserialize)]
struct PromptCatalog {
    #[serde(rename = "prompts")]
    templates: HashMap<String, PromptTemplate>,
}

static PROMPT_CATALOG: OnceLock<PromptCatalog> = OnceLock::new();

#[allow(clippy::expect_used)] // embedded catalog; a parse failure is a build defect
fn prompt_catalog() -> &'static PromptCatalog {
    PROMPT_CATALOG.get_or_init(|| {
        serde_yaml::from_str(include_str!("../../templates/prompts.yaml"))
            .expect("failed to load prompt catalog")
    })
}

/// A rendered system/user prompt pair.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    /// System instructions for the model.
    pub system: String,
    /// User prompt carrying the file list and the fitted diff.
    pub user: String,
}

/// Renders the template for `style` with the staged file list and the
/// fitted diff content.
pub fn render(style: CommitStyle, files_changed: &[String], diff_content: &str) -> Result<RenderedPrompt> {
    let template = prompt_catalog()
        .templates
        .get(style.as_str())
        .ok_or_else(|| anyhow!("no prompt template named '{}'", style.as_str()))?;

    let files = if files_changed.is_empty() {
        "No files".to_string()
    } else {
        files_changed.join(", ")
    };

    let user = template
        .template
        .replace("{files_changed}", &files)
        .replace("{diff_content}", diff_content);

    Ok(RenderedPrompt {
        system: template.system.clone(),
        user,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn style_parsing_accepts_both_forms() {
        assert_eq!(
            "commit_conventional".parse::<CommitStyle>().unwrap(),
            CommitStyle::Conventional
        );
        assert_eq!(
            "detailed".parse::<CommitStyle>().unwrap(),
            CommitStyle::Detailed
        );
        assert_eq!(
            "commit_simple".parse::<CommitStyle>().unwrap(),
            CommitStyle::Simple
        );
        assert!("haiku".parse::<CommitStyle>().is_err());
    }

    #[test]
    fn style_overheads_match_catalog() {
        assert_eq!(CommitStyle::Conventional.prompt_overhead(), 600);
        assert_eq!(CommitStyle::Detailed.prompt_overhead(), 850);
        assert_eq!(CommitStyle::Simple.prompt_overhead(), 500);
    }

    #[test]
    fn render_substitutes_both_placeholders() {
        let files = vec!["src/lib.rs".to_string(), "src/main.rs".to_string()];
        let rendered = render(CommitStyle::Conventional, &files, "DIFF BODY HERE").unwrap();

        assert!(rendered.user.contains("src/lib.rs, src/main.rs"));
        assert!(rendered.user.contains("DIFF BODY HERE"));
        assert!(!rendered.user.contains("{files_changed}"));
        assert!(!rendered.user.contains("{diff_content}"));
        assert!(!rendered.system.is_empty());
    }

    #[test]
    fn render_empty_file_list() {
        let rendered = render(CommitStyle::Simple, &[], "diff").unwrap();
        assert!(rendered.user.contains("No files"));
    }

    #[test]
    fn every_style_has_a_template() {
        for style in CommitStyle::all() {
            let rendered = render(*style, &["a.rs".to_string()], "x").unwrap();
            assert!(rendered.user.contains('x'));
        }
    }
}
