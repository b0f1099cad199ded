//! pf - Project Foundation Framework CLI
//!
//! Entry point for rendering, checking and scaffolding framework templates.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use regex::Regex;
use serde_json::json;
use tracing::{debug, info};

use foundation::cli::{Cli, Command, OutputFormat, ProjectCommand};
use foundation::config::Config;
use foundation::{
    PROJECT_FILE, ProjectConfig, RenderOptions, Renderer, Scaffolder, Syntax, Template, TemplateCatalog, Values,
};

fn parse_level(level: Option<&str>) -> tracing::Level {
    match level.map(|s| s.to_uppercase()).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("foundation")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = parse_level(cli_log_level.or(config_log_level));

    let log_file = fs::File::create(log_dir.join("pf.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("pf starting");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Render {
            template,
            set,
            values,
            project,
            output,
            strict,
            syntax,
        } => cmd_render(
            &config,
            &template,
            &set,
            values.as_deref(),
            project.as_deref(),
            output.as_deref(),
            strict,
            syntax,
        ),
        Command::Placeholders {
            templates,
            matching,
            format,
        } => cmd_placeholders(&config, &templates, matching.as_deref(), format),
        Command::Check { templates, strict } => cmd_check(&config, &templates, strict),
        Command::Templates { format } => cmd_templates(&config, format),
        Command::Init {
            dir,
            name,
            force,
            dry_run,
        } => cmd_init(&config, &dir, name, force, dry_run),
        Command::Project { command } => match command {
            ProjectCommand::Validate { file } => cmd_project_validate(&file),
            ProjectCommand::Example => {
                print!("{}", foundation::catalog::embedded::PROJECT_CONFIG);
                Ok(())
            }
        },
    }
}

fn catalog(config: &Config) -> TemplateCatalog {
    TemplateCatalog::new(".", config.templates_dir.clone())
}

/// Layer values: config (auto date, defaults) < project < values file < --set
fn collect_values(config: &Config, project: Option<&Path>, values_file: Option<&Path>, set: &[String]) -> Result<Values> {
    let mut values = config.base_values()?;

    let default_project = Path::new(PROJECT_FILE);
    let project = project.or_else(|| default_project.is_file().then_some(default_project));
    if let Some(path) = project {
        let project = ProjectConfig::load(path).context(format!("Failed to load project config: {}", path.display()))?;
        values.merge(project.to_values());
    }

    if let Some(path) = values_file {
        values.merge(Values::load(path).context(format!("Failed to load values: {}", path.display()))?);
    }

    values.merge(Values::from_pairs(set)?);
    debug!(count = values.len(), "collect_values: done");
    Ok(values)
}

/// Expand glob patterns to files; anything else goes through the catalog
fn resolve_templates(catalog: &TemplateCatalog, specs: &[String]) -> Result<Vec<Template>> {
    let mut templates = Vec::new();
    for spec in specs {
        if spec.contains('*') || spec.contains('?') {
            let mut matched = 0usize;
            for entry in glob::glob(spec).context(format!("Invalid glob pattern: {}", spec))? {
                let path = entry?;
                if path.is_file() {
                    templates.push(Template::from_path(&path)?);
                    matched += 1;
                }
            }
            if matched == 0 {
                return Err(eyre!("No files match pattern: {}", spec));
            }
        } else {
            templates.push(catalog.load(spec)?);
        }
    }
    Ok(templates)
}

fn display_name(template: &Template) -> String {
    template
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| template.name().to_string())
}

#[allow(clippy::too_many_arguments)]
fn cmd_render(
    config: &Config,
    template: &str,
    set: &[String],
    values_file: Option<&Path>,
    project: Option<&Path>,
    output: Option<&Path>,
    strict: bool,
    syntax: Option<Syntax>,
) -> Result<()> {
    debug!(%template, ?values_file, ?project, ?output, %strict, ?syntax, "cmd_render: called");
    let mut template = catalog(config).load(template)?;
    if let Some(syntax) = syntax {
        template = template.with_syntax(syntax);
    }
    let values = collect_values(config, project, values_file, set)?;

    let renderer = Renderer::new(RenderOptions {
        strict: strict || config.strict,
    });
    let rendered = renderer.render(&template, &values)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &rendered.text).context(format!("Failed to write {}", path.display()))?;
            println!("{} Rendered {} to {}", "✓".green(), template.name().cyan(), path.display());
        }
        None => print!("{}", rendered.text),
    }

    if !rendered.is_complete() {
        eprintln!(
            "{} {} placeholder(s) left for manual completion: {}",
            "⚠".yellow(),
            rendered.unresolved.len(),
            rendered.unresolved.join(", ")
        );
    }
    Ok(())
}

fn cmd_placeholders(config: &Config, specs: &[String], matching: Option<&str>, format: OutputFormat) -> Result<()> {
    debug!(?specs, ?matching, ?format, "cmd_placeholders: called");
    let templates = resolve_templates(&catalog(config), specs)?;
    let filter = matching.map(Regex::new).transpose()?;
    let keep = |name: &String| filter.as_ref().map(|re| re.is_match(name)).unwrap_or(true);

    match format {
        OutputFormat::Json => {
            let listing: Vec<_> = templates
                .iter()
                .map(|t| {
                    json!({
                        "template": display_name(t),
                        "category": t.category(),
                        "syntax": t.syntax(),
                        "placeholders": t.placeholders().into_iter().filter(|n| keep(n)).collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        OutputFormat::Text => {
            for template in &templates {
                println!("{} ({})", display_name(template).cyan(), template.category());
                if template.syntax() == Syntax::Script {
                    for name in template.placeholders().iter().filter(|n| keep(*n)) {
                        println!("  {}", name);
                    }
                    continue;
                }
                let scan = template.scan();
                for name in scan.placeholders().iter().filter(|n| keep(*n)) {
                    let lines: Vec<String> = scan
                        .occurrences
                        .iter()
                        .filter(|o| &o.name == name)
                        .map(|o| o.line.to_string())
                        .collect();
                    println!("  [{}] {}", name, format!("line {}", lines.join(", ")).dimmed());
                }
            }
        }
    }
    Ok(())
}

fn cmd_check(config: &Config, specs: &[String], strict: bool) -> Result<()> {
    debug!(?specs, %strict, "cmd_check: called");
    let templates = resolve_templates(&catalog(config), specs)?;
    let mut problems = 0usize;

    for template in &templates {
        let name = display_name(template);

        if template.syntax() == Syntax::Script {
            // Render with no values to surface syntax errors
            if let Err(e) = Renderer::default().render(template, &Values::new()) {
                println!("{}: {}", name.yellow(), e);
                problems += 1;
                continue;
            }
        }

        let scan = template.scan();
        for m in &scan.malformed {
            println!("{}:{}:{}: {}", name, m.line, m.column, m.kind);
        }
        problems += scan.malformed.len();

        let placeholders = template.placeholders();
        if strict && !placeholders.is_empty() {
            println!("{}: unresolved placeholders: {}", name.yellow(), placeholders.join(", "));
            problems += 1;
        }

        if scan.is_well_formed() && !(strict && !placeholders.is_empty()) {
            println!("{} {} ({} placeholders)", "✓".green(), name, placeholders.len());
        }
    }

    if problems > 0 {
        return Err(eyre!("{} problem(s) found", problems));
    }
    Ok(())
}

fn cmd_templates(config: &Config, format: OutputFormat) -> Result<()> {
    debug!(?format, "cmd_templates: called");
    let entries = catalog(config).list()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            for entry in entries {
                println!("{:<16} {}", entry.name.cyan(), entry.source.to_string().dimmed());
            }
        }
    }
    Ok(())
}

fn cmd_init(config: &Config, dir: &Path, name: Option<String>, force: bool, dry_run: bool) -> Result<()> {
    debug!(?dir, ?name, %force, %dry_run, "cmd_init: called");
    let project_name = match name {
        Some(name) => name,
        None => {
            let absolute = if dir.exists() {
                dir.canonicalize()?
            } else {
                dir.to_path_buf()
            };
            absolute
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "project".to_string())
        }
    };

    let mut values = config.base_values()?;
    values.set("Project Name", project_name.as_str());
    values.set("PROJECT_NAME", project_name.as_str());

    let scaffolder = Scaffolder::new(dir);
    let files = scaffolder.plan(&values)?;

    if dry_run {
        println!("Would initialize {} in: {}", project_name.cyan(), dir.display());
        for file in &files {
            let exists = dir.join(&file.path).exists();
            let note = if exists && !force { " (exists, kept)" } else { "" };
            println!("  {}{}", file.path.display(), note.dimmed());
        }
        return Ok(());
    }

    println!("Initializing {} in: {}", project_name.cyan(), dir.display());
    let report = scaffolder.apply(&files, force)?;
    for (path, action) in &report.entries {
        println!("  {:<12} {}", format!("{}:", action), path.display());
    }
    println!("{} Framework ready", "✓".green());
    Ok(())
}

fn cmd_project_validate(file: &Path) -> Result<()> {
    debug!(?file, "cmd_project_validate: called");
    let project = ProjectConfig::load(file).context(format!("Failed to load project config: {}", file.display()))?;
    let warnings = project.validate();

    if warnings.is_empty() {
        println!("{} {} is valid", "✓".green(), file.display());
    } else {
        for warning in &warnings {
            println!("{} {}", "⚠".yellow(), warning);
        }
        println!("{} warning(s) in {}", warnings.len(), file.display());
    }
    Ok(())
}
