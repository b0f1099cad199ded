//! Foundation - Project Foundation Framework tooling
//!
//! The framework is a directory convention of Markdown templates (PRD,
//! glossary, current state), a JSON project config, and script templates.
//! This crate makes it mechanical: it loads templates, finds their
//! placeholders, and renders them with supplied values, leaving anything
//! without a value in place for manual completion.
//!
//! # Modules
//!
//! - [`template`] - Template documents, placeholder scanning and rendering
//! - [`values`] - Substitution values
//! - [`catalog`] - Named templates with on-disk overrides
//! - [`project`] - The project config record
//! - [`scaffold`] - Writing the framework layout into a project
//! - [`config`] - CLI configuration
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```
//! use foundation::{Template, Renderer, Values};
//!
//! let template = Template::new("status.md", "Last Updated: [DATE]\n- **Status**: [Complete]");
//! let values: Values = [("DATE", "2024-01-01")].into_iter().collect();
//! let rendered = Renderer::default().render(&template, &values).unwrap();
//! assert_eq!(rendered.text, "Last Updated: 2024-01-01\n- **Status**: [Complete]");
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod project;
pub mod scaffold;
pub mod template;
pub mod values;

pub use catalog::{CatalogEntry, TemplateCatalog, TemplateSource};
pub use config::Config;
pub use error::FrameworkError;
pub use project::{ConfigWarning, ProjectConfig};
pub use scaffold::{ScaffoldAction, ScaffoldFile, ScaffoldReport, Scaffolder};
pub use template::{RenderOptions, Rendered, Renderer, Syntax, Template, TemplateCategory, render_str};
pub use values::Values;

/// Default chrono format for the automatic `DATE` value
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Project config file name written by `pf init`
pub const PROJECT_FILE: &str = "project.json";
