//! Template Loader
//!
//! Loads templates from override directories or falls back to embedded defaults.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::{OVERRIDE_DIR, embedded};
use crate::error::{FrameworkError, Result};
use crate::template::Template;

/// Where a catalog template came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum TemplateSource {
    Override(PathBuf),
    Directory(PathBuf),
    Embedded,
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Override(path) => write!(f, "override {}", path.display()),
            Self::Directory(path) => write!(f, "directory {}", path.display()),
            Self::Embedded => write!(f, "embedded"),
        }
    }
}

/// A name resolvable by the catalog and the source that wins for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub source: TemplateSource,
}

/// Resolves template names through the override chain
pub struct TemplateCatalog {
    /// Project override directory (e.g., `.framework/templates/`)
    override_dir: Option<PathBuf>,
    /// Configured templates directory
    templates_dir: Option<PathBuf>,
}

impl TemplateCatalog {
    /// Create a catalog for a project root and an optional extra directory
    pub fn new(project_root: impl AsRef<Path>, templates_dir: Option<PathBuf>) -> Self {
        let project_root = project_root.as_ref();
        debug!(?project_root, ?templates_dir, "TemplateCatalog::new: called");
        let override_dir = project_root.join(OVERRIDE_DIR);

        Self {
            override_dir: override_dir.is_dir().then_some(override_dir),
            templates_dir: templates_dir.filter(|d| d.is_dir()),
        }
    }

    /// Create a catalog that only knows the embedded templates
    pub fn embedded_only() -> Self {
        debug!("TemplateCatalog::embedded_only: called");
        Self {
            override_dir: None,
            templates_dir: None,
        }
    }

    /// Load a template given either a path to a file or a catalog name
    pub fn load(&self, spec: &str) -> Result<Template> {
        debug!(%spec, "TemplateCatalog::load: called");
        let path = Path::new(spec);
        if path.is_file() || spec.contains('/') || spec.contains('\\') {
            debug!("TemplateCatalog::load: treating spec as a path");
            return Template::from_path(path);
        }
        self.resolve(spec)
    }

    /// Resolve a catalog name through the lookup chain
    pub fn resolve(&self, name: &str) -> Result<Template> {
        debug!(%name, "TemplateCatalog::resolve: called");
        for dir in [&self.override_dir, &self.templates_dir].into_iter().flatten() {
            if let Some(path) = find_in_dir(dir, name) {
                info!("Loading template '{}' from {}", name, path.display());
                return Template::from_path(&path);
            }
            debug!(?dir, %name, "TemplateCatalog::resolve: not found in directory");
        }

        if let Some(embedded) = embedded::get_embedded(name) {
            debug!(%name, "TemplateCatalog::resolve: using embedded template");
            return Ok(Template::new(embedded.file_name, embedded.content));
        }

        debug!(%name, "TemplateCatalog::resolve: not found anywhere");
        Err(FrameworkError::TemplateNotFound { name: name.to_string() })
    }

    /// List every resolvable name with the source that wins for it
    pub fn list(&self) -> Result<Vec<CatalogEntry>> {
        debug!("TemplateCatalog::list: called");
        let mut entries: BTreeMap<String, TemplateSource> = BTreeMap::new();

        for template in embedded::all() {
            entries.insert(template.name.to_string(), TemplateSource::Embedded);
        }
        if let Some(dir) = &self.templates_dir {
            for (name, path) in names_in_dir(dir)? {
                entries.insert(name, TemplateSource::Directory(path));
            }
        }
        if let Some(dir) = &self.override_dir {
            for (name, path) in names_in_dir(dir)? {
                entries.insert(name, TemplateSource::Override(path));
            }
        }

        Ok(entries
            .into_iter()
            .map(|(name, source)| CatalogEntry { name, source })
            .collect())
    }
}

/// Catalog name for a file name: strip the extension and a `-template` suffix
fn catalog_name(file_name: &str) -> &str {
    let stem = file_name.split_once('.').map(|(s, _)| s).unwrap_or(file_name);
    stem.strip_suffix("-template").unwrap_or(stem)
}

fn find_in_dir(dir: &Path, name: &str) -> Option<PathBuf> {
    let exact = dir.join(name);
    if exact.is_file() {
        return Some(exact);
    }
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| catalog_name(n) == name)
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

fn names_in_dir(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| FrameworkError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(file_name) = entry.file_name().to_str() {
            if file_name.starts_with('.') {
                continue;
            }
            names.push((catalog_name(file_name).to_string(), entry.path().to_path_buf()));
        }
    }
    Ok(names)
}
