//! CLI command definitions and subcommands

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::template::Syntax;

/// pf - Project Foundation Framework templates
#[derive(Parser, Debug)]
#[command(name = "pf")]
#[command(author, version, about = "Render and scaffold Project Foundation Framework templates", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a template, substituting supplied values
    Render {
        /// Catalog name (prd, glossary, ...) or path to a template file
        #[arg(required = true)]
        template: String,

        /// Value for a placeholder, as KEY=VALUE (repeatable)
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// YAML or JSON file of values
        #[arg(long)]
        values: Option<PathBuf>,

        /// Project config to derive values from (default: ./project.json if present)
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail on malformed or unresolved placeholders
        #[arg(long)]
        strict: bool,

        /// Placeholder syntax, when the file name does not tell
        #[arg(long, value_enum)]
        syntax: Option<Syntax>,
    },

    /// List the placeholders in template files
    Placeholders {
        /// File paths, glob patterns, or catalog names
        #[arg(required = true)]
        templates: Vec<String>,

        /// Only show names matching this regex
        #[arg(short, long)]
        matching: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Report malformed brackets in template files
    Check {
        /// File paths, glob patterns, or catalog names
        #[arg(required = true)]
        templates: Vec<String>,

        /// Also fail on placeholders that would stay unresolved
        #[arg(long)]
        strict: bool,
    },

    /// List available templates and where each comes from
    Templates {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Scaffold the framework into a project directory
    Init {
        /// Project directory (default: current directory)
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Project name (default: directory name)
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// Show what would be written without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Work with the project config file
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Check a project config for unknown keys and unfilled placeholders
    Validate {
        /// Path to the project config
        #[arg(default_value = "project.json")]
        file: PathBuf,
    },

    /// Print the example project config
    Example,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_with_values() {
        let cli = Cli::parse_from(["pf", "render", "prd", "--set", "DATE=2024-01-01", "-s", "Owner=sam", "--strict"]);
        match cli.command {
            Command::Render { template, set, strict, .. } => {
                assert_eq!(template, "prd");
                assert_eq!(set, vec!["DATE=2024-01-01", "Owner=sam"]);
                assert!(strict);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_project_validate_default_file() {
        let cli = Cli::parse_from(["pf", "project", "validate"]);
        match cli.command {
            Command::Project {
                command: ProjectCommand::Validate { file },
            } => assert_eq!(file, PathBuf::from("project.json")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_log_level_after_subcommand() {
        let cli = Cli::parse_from(["pf", "templates", "--log-level", "debug", "--format", "json"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Command::Templates { format: OutputFormat::Json }));
    }
}
