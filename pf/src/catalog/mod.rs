//! Template Catalog
//!
//! Resolves template names to documents.
//!
//! Lookup chain for a name:
//! 1. `.framework/templates/{name}*` (project override)
//! 2. `{templates_dir}/{name}*` (configured directory)
//! 3. Embedded default compiled into the binary
//!
//! A file matches a name when it is called `{name}`, `{name}.{ext}` or
//! `{name}-template.{ext}`.

pub mod embedded;
mod loader;

pub use embedded::EmbeddedTemplate;
pub use loader::{CatalogEntry, TemplateCatalog, TemplateSource};

/// Project-relative directory holding template overrides
pub const OVERRIDE_DIR: &str = ".framework/templates";
