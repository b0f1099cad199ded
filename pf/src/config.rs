//! Configuration for the pf CLI

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use tracing::debug;

use crate::values::Values;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Extra directory searched for templates before the embedded defaults
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,

    /// Fail on malformed or unresolved placeholders
    #[serde(default)]
    pub strict: bool,

    /// Fill `DATE` with today's date when no value is supplied
    #[serde(default = "default_auto_date")]
    pub auto_date: bool,

    /// chrono format string for the automatic date
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Values applied beneath everything supplied on the command line
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_auto_date() -> bool {
    true
}

fn default_date_format() -> String {
    crate::DEFAULT_DATE_FORMAT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates_dir: None,
            strict: false,
            auto_date: default_auto_date(),
            date_format: default_date_format(),
            defaults: BTreeMap::new(),
            log_level: None,
        }
    }
}

impl Config {
    /// Default locations checked when no config path is given
    fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("foundation").join("config.yml")),
            Some(PathBuf::from("foundation.yml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn discover(path: Option<&PathBuf>) -> Option<PathBuf> {
        if let Some(config_path) = path {
            return Some(config_path.clone());
        }
        Self::default_paths().into_iter().find(|p| p.exists())
    }

    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        let Some(config_path) = Self::discover(path) else {
            debug!("Config::load: no config file found, using defaults");
            return Ok(Config::default());
        };

        debug!(?config_path, "Config::load: reading");
        let content = std::fs::read_to_string(&config_path)
            .context(format!("Failed to read config file: {}", config_path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .context(format!("Failed to parse config file: {}", config_path.display()))?;
        check_date_format(&config.date_format)
            .context(format!("Invalid config file: {}", config_path.display()))?;
        Ok(config)
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed here; `load` reports them once logging works.
    pub fn load_log_level(path: Option<&PathBuf>) -> Option<String> {
        let config_path = Self::discover(path)?;
        let content = std::fs::read_to_string(config_path).ok()?;
        let config: Config = serde_yaml::from_str(&content).ok()?;
        config.log_level
    }

    /// The lowest layer of values: auto date, then configured defaults
    pub fn base_values(&self) -> Result<Values> {
        let mut values = Values::new();
        if self.auto_date {
            let mut today = String::new();
            write!(today, "{}", chrono::Local::now().format(&self.date_format))
                .map_err(|_| eyre!("Cannot format date with '{}'", self.date_format))?;
            values.set("DATE", today);
        }
        for (key, value) in &self.defaults {
            values.set(key.as_str(), value.as_str());
        }
        Ok(values)
    }
}

/// Reject strftime strings chrono cannot format
fn check_date_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(eyre!("Invalid date_format '{}'", format));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.strict);
        assert!(config.auto_date);
        assert_eq!(config.date_format, "%Y-%m-%d");
        assert!(config.templates_dir.is_none());
    }

    #[test]
    fn test_load_partial_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        std::fs::write(&path, "strict: true\ndefaults:\n  Owner: sam\nlog_level: debug\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(config.strict);
        assert!(config.auto_date);
        assert_eq!(config.defaults.get("Owner"), Some(&"sam".to_string()));
        assert_eq!(Config::load_log_level(Some(&path)), Some("debug".to_string()));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert_eq!(Config::load_log_level(Some(&path)), None);
    }

    #[test]
    fn test_load_templates_dir() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        std::fs::write(&path, "templates_dir: /srv/templates\n").unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.templates_dir, Some(PathBuf::from("/srv/templates")));
    }

    #[test]
    fn test_invalid_date_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        std::fs::write(&path, "date_format: \"%Q\"\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid date_format '%Q'"));

        let mut config = Config::default();
        config.date_format = "%Q".to_string();
        assert!(config.base_values().is_err());
    }

    #[test]
    fn test_base_values() {
        let mut config = Config::default();
        config.date_format = "%Y".to_string();
        config.defaults.insert("DATE".to_string(), "fixed".to_string());
        config.defaults.insert("Owner".to_string(), "sam".to_string());

        let values = config.base_values().unwrap();
        assert_eq!(values.substitution("DATE"), Some("fixed".to_string()));
        assert_eq!(values.substitution("Owner"), Some("sam".to_string()));

        config.defaults.clear();
        let year = config.base_values().unwrap().substitution("DATE").unwrap();
        assert_eq!(year.len(), 4);

        config.auto_date = false;
        assert!(!config.base_values().unwrap().contains("DATE"));
    }
}
