//! Framework error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or rendering templates
#[derive(Debug, Error)]
pub enum FrameworkError {
    #[error("Malformed placeholder in {template} at line {line}, column {column}: {reason}")]
    MalformedPlaceholder {
        template: String,
        line: usize,
        column: usize,
        reason: String,
    },

    #[error("Unresolved placeholders in {template}: {}", names.join(", "))]
    UnresolvedPlaceholders { template: String, names: Vec<String> },

    #[error("Template not found: {name}")]
    TemplateNotFound { name: String },

    #[error("Template file not found: {path}")]
    TemplateFileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render script template {template}: {message}")]
    Script { template: String, message: String },

    #[error("Invalid value assignment '{0}' (expected KEY=VALUE)")]
    InvalidAssignment(String),

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_placeholder_message() {
        let err = FrameworkError::MalformedPlaceholder {
            template: "prd".to_string(),
            line: 3,
            column: 14,
            reason: "unclosed '['".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("prd"));
        assert!(msg.contains("line 3"));
        assert!(msg.contains("column 14"));
    }

    #[test]
    fn test_unresolved_message_lists_names() {
        let err = FrameworkError::UnresolvedPlaceholders {
            template: "glossary".to_string(),
            names: vec!["DATE".to_string(), "Term".to_string()],
        };

        assert!(err.to_string().ends_with("DATE, Term"));
    }
}
