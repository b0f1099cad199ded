//! Embedded templates
//!
//! Compiled into the binary from the files under `templates/`.

use tracing::debug;

/// Product Requirements Document template
pub const PRD: &str = include_str!("../../templates/prd.md");

/// Project glossary template
pub const GLOSSARY: &str = include_str!("../../templates/glossary.md");

/// Context-tracking template for the current state of work
pub const CURRENT_STATE: &str = include_str!("../../templates/current-state.md");

/// Example project configuration
pub const PROJECT_CONFIG: &str = include_str!("../../templates/project-config.json");

/// Development environment health check script
pub const HEALTH_CHECK: &str = include_str!("../../templates/health-check-template.py");

/// A template shipped with the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedTemplate {
    /// Catalog name
    pub name: &'static str,
    /// File name used when the template is written to disk
    pub file_name: &'static str,
    pub content: &'static str,
}

const ALL: [EmbeddedTemplate; 5] = [
    EmbeddedTemplate {
        name: "prd",
        file_name: "prd.md",
        content: PRD,
    },
    EmbeddedTemplate {
        name: "glossary",
        file_name: "glossary.md",
        content: GLOSSARY,
    },
    EmbeddedTemplate {
        name: "current-state",
        file_name: "current-state.md",
        content: CURRENT_STATE,
    },
    EmbeddedTemplate {
        name: "project-config",
        file_name: "project-config.json",
        content: PROJECT_CONFIG,
    },
    EmbeddedTemplate {
        name: "health-check",
        file_name: "health-check-template.py",
        content: HEALTH_CHECK,
    },
];

/// All embedded templates
pub fn all() -> &'static [EmbeddedTemplate] {
    &ALL
}

/// Get the embedded template by name
pub fn get_embedded(name: &str) -> Option<EmbeddedTemplate> {
    debug!(%name, "get_embedded: called");
    let found = ALL.iter().find(|t| t.name == name).copied();
    if found.is_none() {
        debug!("get_embedded: no match found");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_prd() {
        let prd = get_embedded("prd").unwrap();
        assert!(prd.content.starts_with("# [Feature Name] PRD"));
        assert!(prd.content.contains("Last Updated: [DATE]"));
        assert!(prd.content.contains("## Executive Summary"));
        assert!(prd.content.contains("## Problem Statement"));
        assert!(prd.content.contains("## Goals & Success Metrics"));
    }

    #[test]
    fn test_get_embedded_project_config_is_json() {
        let config = get_embedded("project-config").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(config.content).unwrap();
        assert!(parsed["technicalPreferences"]["defaults"].is_object());
    }

    #[test]
    fn test_get_embedded_health_check_uses_script_syntax() {
        let check = get_embedded("health-check").unwrap();
        assert!(check.content.contains("{{#if_language_python}}"));
        assert!(check.content.contains("{{#each REQUIRED_ENV_VARS}}"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }

    #[test]
    fn test_all_names_unique() {
        let mut names: Vec<&str> = all().iter().map(|t| t.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), all().len());
    }
}
