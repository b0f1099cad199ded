//! Substitution values
//!
//! Values map placeholder names to JSON values. Strings substitute verbatim,
//! numbers and booleans by their display form. Lists and objects only feed
//! script templates (`{{#each}}`, item fields).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{FrameworkError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(BTreeMap<String, Value>);

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Overlay `other` on top of these values; `other` wins on conflicts
    pub fn merge(&mut self, other: Values) {
        debug!(count = other.len(), "Values::merge: called");
        self.0.extend(other.0);
    }

    /// Text a bracket placeholder should be replaced with, if any
    pub fn substitution(&self, name: &str) -> Option<String> {
        match self.0.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Parse `KEY=VALUE` assignments; the value may itself contain `=`
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            match pair.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => values.set(key.trim(), value),
                _ => return Err(FrameworkError::InvalidAssignment(pair.to_string())),
            }
        }
        Ok(values)
    }

    /// Load values from a YAML or JSON file (chosen by extension)
    pub fn load(path: &Path) -> Result<Self> {
        debug!(?path, "Values::load: called");
        let content = std::fs::read_to_string(path)?;
        let is_json = path.extension().map(|e| e == "json").unwrap_or(false);

        let parsed: std::result::Result<BTreeMap<String, Value>, String> = if is_json {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map(Self).map_err(|message| FrameworkError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// All values as a JSON object, for script rendering
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Values {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
