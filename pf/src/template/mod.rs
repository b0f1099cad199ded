//! Template documents
//!
//! A template is raw text plus what it is for (its category) and how its
//! placeholders are written (its syntax). Markdown templates use bracket
//! placeholders such as `[DATE]`; JSON templates use the same tokens inside
//! string literals; script templates use `{{NAME}}` tags.

mod placeholder;
mod render;
mod script;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{FrameworkError, Result};

pub use placeholder::{Malformed, MalformedKind, Occurrence, Scan, scan, scan_json_strings};
pub use render::{RenderOptions, Rendered, Renderer, render_str};
pub use script::{ScriptScan, scan_script};

/// How placeholders are written in a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// `[Name]` anywhere in the text
    Markdown,
    /// `[Name]` inside JSON string literals
    Json,
    /// `{{NAME}}`, `{{#if_flag}}`, `{{#each LIST}}`
    Script,
}

impl Syntax {
    /// Pick the syntax from a file name
    pub fn detect(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        let document = lower.ends_with(".md") || lower.ends_with(".json") || lower.ends_with(".txt");
        if lower.ends_with(".hbs") || (lower.contains("-template.") && !document) {
            Self::Script
        } else if lower.ends_with(".json") {
            Self::Json
        } else {
            Self::Markdown
        }
    }
}

/// What a template is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateCategory {
    Prd,
    Glossary,
    CurrentState,
    ProjectConfig,
    HealthCheck,
    Other,
}

impl TemplateCategory {
    /// Guess the category from the file name, falling back to the first heading
    pub fn detect(file_name: &str, content: &str) -> Self {
        let lower = file_name.to_lowercase();
        if lower.contains("health-check") || lower.contains("health_check") {
            return Self::HealthCheck;
        }
        if lower.contains("current-state") || lower.contains("current_state") {
            return Self::CurrentState;
        }
        if lower.contains("glossary") {
            return Self::Glossary;
        }
        if lower.contains("prd") {
            return Self::Prd;
        }
        if lower.ends_with(".json") && (lower.contains("project") || lower.contains("config")) {
            return Self::ProjectConfig;
        }

        let heading = content.lines().find(|l| l.starts_with("# ")).unwrap_or("");
        if heading.trim_end().ends_with(" PRD") {
            Self::Prd
        } else if heading.contains("Glossary") {
            Self::Glossary
        } else if heading.starts_with("# Current State") {
            Self::CurrentState
        } else {
            Self::Other
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Prd => "PRD template",
            Self::Glossary => "glossary template",
            Self::CurrentState => "current-state template",
            Self::ProjectConfig => "project-config template",
            Self::HealthCheck => "health-check script template",
            Self::Other => "template",
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A loaded template document
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    path: Option<PathBuf>,
    content: String,
    syntax: Syntax,
    category: TemplateCategory,
}

impl Template {
    /// Create a template from in-memory text; `name` is treated as a file name
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        let content = content.into();
        debug!(%name, len = content.len(), "Template::new: called");
        Self {
            syntax: Syntax::detect(&name),
            category: TemplateCategory::detect(&name, &content),
            name,
            path: None,
            content,
        }
    }

    /// Read a template from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(?path, "Template::from_path: called");
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FrameworkError::TemplateFileNotFound {
                    path: path.to_path_buf(),
                    source,
                }
            } else {
                FrameworkError::Io(source)
            }
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let mut template = Self::new(name, content);
        template.path = Some(path.to_path_buf());
        Ok(template)
    }

    /// Override the detected syntax
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn category(&self) -> TemplateCategory {
        self.category
    }

    /// Bracket scan for this template's syntax (empty for script templates)
    pub fn scan(&self) -> Scan {
        match self.syntax {
            Syntax::Markdown => scan(&self.content),
            Syntax::Json => scan_json_strings(&self.content),
            Syntax::Script => Scan::default(),
        }
    }

    /// Distinct placeholder names, in order of first appearance
    pub fn placeholders(&self) -> Vec<String> {
        match self.syntax {
            Syntax::Script => scan_script(&self.content).names(),
            _ => self.scan().placeholders(),
        }
    }
}
