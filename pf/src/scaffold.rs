//! Framework scaffolding
//!
//! Lays the framework out in a project directory:
//!
//! ```text
//! {root}/
//! ├── project.json
//! ├── .framework/
//! │   ├── README.md
//! │   └── templates/          # editable copies of the embedded templates
//! └── docs/
//!     ├── glossary.md
//!     ├── context/current-state.md
//!     └── prd/README.md
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::catalog::{OVERRIDE_DIR, embedded};
use crate::error::Result;
use crate::template::{Renderer, Template};
use crate::values::Values;

const FRAMEWORK_README: &str = "# Project Foundation Framework

This directory holds the templates used to plan and track work on this project.

- `templates/` - editable copies of the framework templates. Files here override
  the built-in versions of the same name.

Render a template with `pf render <name> --set KEY=VALUE`. Bracketed
placeholders such as `[Feature Name]` that have no value are left in place for
manual completion.
";

const PRD_README: &str = "# Product Requirements Documents

One PRD per feature, named `<feature-name>.md`. Start from the PRD template:

    pf render prd --set \"Feature Name=...\" --output docs/prd/<feature-name>.md

Keep `docs/context/current-state.md` pointing at the PRD being worked on.
";

/// A file the scaffold wants to write, relative to the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldFile {
    pub path: PathBuf,
    pub content: String,
}

/// What happened to a planned file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaffoldAction {
    Created,
    Overwritten,
    Skipped,
}

impl fmt::Display for ScaffoldAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Overwritten => write!(f, "overwritten"),
            Self::Skipped => write!(f, "exists"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScaffoldReport {
    pub entries: Vec<(PathBuf, ScaffoldAction)>,
}

impl ScaffoldReport {
    pub fn count(&self, action: ScaffoldAction) -> usize {
        self.entries.iter().filter(|(_, a)| *a == action).count()
    }
}

/// Plans and writes the framework layout under a project root
pub struct Scaffolder {
    root: PathBuf,
    renderer: Renderer,
}

impl Scaffolder {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        debug!(?root, "Scaffolder::new: called");
        Self {
            root,
            renderer: Renderer::default(),
        }
    }

    /// Files to write, with documents pre-filled from `values`
    pub fn plan(&self, values: &Values) -> Result<Vec<ScaffoldFile>> {
        debug!(value_count = values.len(), "Scaffolder::plan: called");
        let mut files = Vec::new();

        let project = Template::new("project-config.json", embedded::PROJECT_CONFIG);
        files.push(ScaffoldFile {
            path: PathBuf::from(crate::PROJECT_FILE),
            content: self.renderer.render(&project, values)?.text,
        });

        files.push(ScaffoldFile {
            path: PathBuf::from(".framework/README.md"),
            content: FRAMEWORK_README.to_string(),
        });
        for template in embedded::all() {
            files.push(ScaffoldFile {
                path: Path::new(OVERRIDE_DIR).join(template.file_name),
                content: template.content.to_string(),
            });
        }

        let documents = [
            ("docs/context/current-state.md", "current-state.md", embedded::CURRENT_STATE),
            ("docs/glossary.md", "glossary.md", embedded::GLOSSARY),
        ];
        for (path, name, content) in documents {
            let template = Template::new(name, content);
            files.push(ScaffoldFile {
                path: PathBuf::from(path),
                content: self.renderer.render(&template, values)?.text,
            });
        }

        files.push(ScaffoldFile {
            path: PathBuf::from("docs/prd/README.md"),
            content: PRD_README.to_string(),
        });

        Ok(files)
    }

    /// Write planned files; existing files are kept unless `force` is set
    pub fn apply(&self, files: &[ScaffoldFile], force: bool) -> Result<ScaffoldReport> {
        debug!(count = files.len(), %force, "Scaffolder::apply: called");
        let mut report = ScaffoldReport::default();

        for file in files {
            let target = self.root.join(&file.path);
            let exists = target.exists();
            let action = match (exists, force) {
                (true, false) => {
                    debug!(?target, "Scaffolder::apply: keeping existing file");
                    ScaffoldAction::Skipped
                }
                (true, true) => ScaffoldAction::Overwritten,
                (false, _) => ScaffoldAction::Created,
            };

            if action != ScaffoldAction::Skipped {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&target, &file.content)?;
            }
            report.entries.push((file.path.clone(), action));
        }

        info!(
            root = %self.root.display(),
            created = report.count(ScaffoldAction::Created),
            overwritten = report.count(ScaffoldAction::Overwritten),
            skipped = report.count(ScaffoldAction::Skipped),
            "Scaffold complete"
        );
        Ok(report)
    }
}
