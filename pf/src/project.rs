//! Project configuration record
//!
//! The JSON file that describes a project to the framework. Apart from the
//! well-known keys there is no enforced schema: every field holds free-form
//! JSON, fields that were absent stay absent on save, and unknown keys are
//! preserved.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::catalog::embedded;
use crate::error::{FrameworkError, Result};
use crate::template::scan;
use crate::values::Values;

/// Top-level keys the framework knows about
pub const KNOWN_KEYS: [&str; 15] = [
    "name",
    "description",
    "primaryLanguage",
    "status",
    "framework",
    "database",
    "infrastructure",
    "setupCommands",
    "buildCommands",
    "testCommands",
    "runCommands",
    "projectSpecificGuidelines",
    "integrationPoints",
    "importantNotes",
    "technicalPreferences",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub name: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub description: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub primary_language: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub status: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub framework: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub database: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub infrastructure: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub setup_commands: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub build_commands: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub test_commands: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub run_commands: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub project_specific_guidelines: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub integration_points: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub important_notes: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub technical_preferences: Value,

    /// Keys outside the known set, kept as written
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Something worth telling the user about a project config
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    UnknownKey(String),
    EmptyName,
    UnfilledPlaceholders { field: String, names: Vec<String> },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey(key) => write!(f, "unknown key '{}'", key),
            Self::EmptyName => write!(f, "project name is empty"),
            Self::UnfilledPlaceholders { field, names } => {
                write!(f, "{} still has placeholders: {}", field, names.join(", "))
            }
        }
    }
}

impl ProjectConfig {
    /// The example configuration shipped with the framework
    pub fn example() -> Result<Self> {
        Self::parse(embedded::PROJECT_CONFIG, Path::new("project-config.json"))
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| FrameworkError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load a project config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        debug!(?path, "ProjectConfig::load: called");
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content, path)?;
        info!("Loaded project config '{}' from {}", config.name().unwrap_or_default(), path.display());
        Ok(config)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        debug!(?path, "ProjectConfig::save: called");
        let mut content = serde_json::to_string_pretty(self).map_err(|e| FrameworkError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        content.push('\n');
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Project name, when it is a string
    pub fn name(&self) -> Option<&str> {
        text(&self.name)
    }

    /// Known fields in file order, paired with their JSON key
    fn fields(&self) -> [(&'static str, &Value); 15] {
        [
            ("name", &self.name),
            ("description", &self.description),
            ("primaryLanguage", &self.primary_language),
            ("status", &self.status),
            ("framework", &self.framework),
            ("database", &self.database),
            ("infrastructure", &self.infrastructure),
            ("setupCommands", &self.setup_commands),
            ("buildCommands", &self.build_commands),
            ("testCommands", &self.test_commands),
            ("runCommands", &self.run_commands),
            ("projectSpecificGuidelines", &self.project_specific_guidelines),
            ("integrationPoints", &self.integration_points),
            ("importantNotes", &self.important_notes),
            ("technicalPreferences", &self.technical_preferences),
        ]
    }

    /// Report unknown keys, an empty name, and fields that still hold placeholders
    pub fn validate(&self) -> Vec<ConfigWarning> {
        debug!(name = ?self.name(), "ProjectConfig::validate: called");
        let mut warnings = Vec::new();

        if self.name().is_none() {
            warnings.push(ConfigWarning::EmptyName);
        }
        for key in self.extra.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
            warnings.push(ConfigWarning::UnknownKey(key.clone()));
        }

        let mut fields: Vec<(&str, &Value)> = self.fields().to_vec();
        fields.extend(self.extra.iter().map(|(k, v)| (k.as_str(), v)));
        for (field, value) in fields {
            let mut names = Vec::new();
            collect_placeholders(value, &mut names);
            if !names.is_empty() {
                warnings.push(ConfigWarning::UnfilledPlaceholders {
                    field: field.to_string(),
                    names,
                });
            }
        }

        warnings
    }

    /// Values a template can use, derived from this config
    ///
    /// Only string fields feed the text values and flags; nested objects are
    /// left for the caller to pass in explicitly.
    pub fn to_values(&self) -> Values {
        debug!(name = ?self.name(), "ProjectConfig::to_values: called");
        let mut values = Values::new();

        let fields = [
            ("PROJECT_NAME", &self.name),
            ("PROJECT_DESCRIPTION", &self.description),
            ("PRIMARY_LANGUAGE", &self.primary_language),
            ("FRAMEWORK", &self.framework),
            ("DATABASE", &self.database),
            ("STATUS", &self.status),
        ];
        for (key, value) in fields {
            if let Some(value) = text(value) {
                values.set(key, value);
            }
        }

        if let Some(language) = text(&self.primary_language) {
            values.set(format!("language_{}", flag_suffix(language)), true);
        }
        if let Some(database) = text(&self.database) {
            values.set(format!("database_{}", flag_suffix(database)), true);
        }
        let infrastructure = self.infrastructure.to_string().to_lowercase();
        values.set("docker_required", infrastructure.contains("docker"));

        let lists = [
            ("SETUP_COMMANDS", &self.setup_commands),
            ("BUILD_COMMANDS", &self.build_commands),
            ("TEST_COMMANDS", &self.test_commands),
            ("RUN_COMMANDS", &self.run_commands),
        ];
        for (key, value) in lists {
            let items = string_list(value);
            if !items.is_empty() {
                values.set(key, items);
            }
        }

        values
    }
}

/// Non-blank string content of a field
fn text(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

/// Lower-case a name and replace anything non-alphanumeric with `_`
fn flag_suffix(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn collect_placeholders(value: &Value, names: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            for name in scan(s).placeholders() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_placeholders(v, names)),
        Value::Object(map) => map.values().for_each(|v| collect_placeholders(v, names)),
        _ => {}
    }
}
