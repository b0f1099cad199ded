//! Integration tests for the pf binary
//!
//! Each test runs in its own temp directory with XDG paths pointed inside it,
//! so logs and config discovery never touch the real home directory.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn pf(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pf").expect("pf binary should build");
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_DATA_HOME", dir.join(".data"))
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

// =============================================================================
// render
// =============================================================================

#[test]
fn test_render_embedded_prd() {
    let temp = TempDir::new().expect("Failed to create temp dir");

    pf(temp.path())
        .args(["render", "prd", "--set", "Feature Name=Login", "--set", "DATE=2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Login PRD"))
        .stdout(predicate::str::contains("Last Updated: 2024-01-01"))
        .stdout(predicate::str::contains("- **Status**: [Draft]"))
        .stderr(predicate::str::contains("left for manual completion"));
}

#[test]
fn test_render_file_leaves_unmatched_tokens() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp.path().join("status.md"), "Last Updated: [DATE]\n- **Status**: [Complete]\n").unwrap();

    pf(temp.path())
        .args(["render", "./status.md", "-s", "DATE=2024-01-01"])
        .assert()
        .success()
        .stdout("Last Updated: 2024-01-01\n- **Status**: [Complete]\n");
}

#[test]
fn test_render_strict_fails_on_unresolved() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp.path().join("status.md"), "- **Status**: [Complete]\n").unwrap();

    pf(temp.path())
        .args(["render", "./status.md", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unresolved placeholders"))
        .stderr(predicate::str::contains("Complete"));
}

#[test]
fn test_render_to_output_file_with_values_file() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp.path().join("values.yml"), "Term: Ledger\nDefinition: Append-only record\n").unwrap();

    pf(temp.path())
        .args(["render", "glossary", "--values", "values.yml", "--output", "docs/glossary.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered"));

    let written = fs::read_to_string(temp.path().join("docs/glossary.md")).unwrap();
    assert!(written.contains("- **Ledger**: Append-only record"));
    assert!(!written.contains("[DATE]"), "auto date should fill DATE");
}

#[test]
fn test_render_unknown_template() {
    let temp = TempDir::new().expect("Failed to create temp dir");

    pf(temp.path())
        .args(["render", "no-such-template"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template not found"));
}

#[test]
fn test_render_health_check_from_project() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    fs::write(
        temp.path().join("project.json"),
        r#"{"name": "atlas", "primaryLanguage": "Python", "database": "PostgreSQL", "infrastructure": "none"}"#,
    )
    .unwrap();
    fs::write(temp.path().join("values.json"), r#"{"REQUIRED_ENV_VARS": ["API_KEY"]}"#).unwrap();

    pf(temp.path())
        .args(["render", "health-check", "--values", "values.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("atlas - Health Check Script"))
        .stdout(predicate::str::contains("'API_KEY',"))
        .stdout(predicate::str::contains("DATABASE_URL"))
        .stdout(predicate::str::contains("MONGODB_URI").not())
        .stdout(predicate::str::contains("{{PYTHON_MAJOR}}"));
}

#[test]
fn test_render_declared_script_syntax() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp.path().join("notes.txt"), "{{PROJECT_NAME}} [Owner]\n").unwrap();

    pf(temp.path())
        .args(["render", "./notes.txt", "--syntax", "script", "-s", "PROJECT_NAME=atlas"])
        .assert()
        .success()
        .stdout("atlas [Owner]\n");
}

#[test]
fn test_render_nested_project_fields() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    fs::write(
        temp.path().join("project.json"),
        r#"{"name": "atlas", "database": {"primary": "PostgreSQL"}, "framework": null}"#,
    )
    .unwrap();

    pf(temp.path())
        .args(["render", "current-state", "--set", "DATE=2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Current State: atlas"));
}

#[test]
fn test_invalid_date_format_in_config() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp.path().join("foundation.yml"), "date_format: \"%Q\"\n").unwrap();

    pf(temp.path())
        .args(["render", "prd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date_format"));
}

// =============================================================================
// placeholders / check / templates
// =============================================================================

#[test]
fn test_placeholders_json() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp.path().join("a.md"), "# [Feature Name] PRD\n[DATE]\n- [ ] task\n").unwrap();

    let output = pf(temp.path())
        .args(["placeholders", "*.md", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listing[0]["placeholders"], serde_json::json!(["Feature Name", "DATE"]));
    assert_eq!(listing[0]["category"], "prd");
}

#[test]
fn test_placeholders_matching_filter() {
    let temp = TempDir::new().expect("Failed to create temp dir");

    pf(temp.path())
        .args(["placeholders", "prd", "--matching", "^Goal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[Goal 1]"))
        .stdout(predicate::str::contains("[DATE]").not());
}

#[test]
fn test_check_reports_malformed() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp.path().join("bad.md"), "fine [A]\nbroken [B\n").unwrap();

    pf(temp.path())
        .args(["check", "bad.md"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("bad.md:2:8: unclosed '['"))
        .stderr(predicate::str::contains("1 problem(s) found"));
}

#[test]
fn test_check_clean_templates_pass() {
    let temp = TempDir::new().expect("Failed to create temp dir");

    pf(temp.path())
        .args(["check", "prd", "glossary", "current-state", "project-config", "health-check"])
        .assert()
        .success();
}

#[test]
fn test_templates_lists_embedded_and_overrides() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let overrides = temp.path().join(".framework/templates");
    fs::create_dir_all(&overrides).unwrap();
    fs::write(overrides.join("adr.md"), "# [Decision Title]\n").unwrap();

    pf(temp.path())
        .args(["templates"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prd"))
        .stdout(predicate::str::contains("embedded"))
        .stdout(predicate::str::contains("adr"))
        .stdout(predicate::str::contains("override"));
}

// =============================================================================
// init / project
// =============================================================================

#[test]
fn test_init_scaffolds_and_is_idempotent() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path().join("atlas");

    pf(temp.path())
        .args(["init", "atlas"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created:"));

    assert!(root.join(".framework/templates/prd.md").is_file());
    assert!(root.join("docs/prd/README.md").is_file());
    let state = fs::read_to_string(root.join("docs/context/current-state.md")).unwrap();
    assert!(state.starts_with("# Current State: atlas"));

    pf(temp.path())
        .args(["init", "atlas"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:"))
        .stdout(predicate::str::contains("created:").not());
}

#[test]
fn test_init_dry_run_writes_nothing() {
    let temp = TempDir::new().expect("Failed to create temp dir");

    pf(temp.path())
        .args(["init", "demo", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would initialize"))
        .stdout(predicate::str::contains("project.json"));

    assert!(!temp.path().join("demo").exists());
}

#[test]
fn test_project_validate_after_init() {
    let temp = TempDir::new().expect("Failed to create temp dir");

    pf(temp.path()).args(["init", ".", "--name", "atlas"]).assert().success();

    pf(temp.path())
        .args(["project", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("still has placeholders"))
        .stdout(predicate::str::contains("Project Name").not());

    pf(temp.path())
        .args(["render", "current-state", "--set", "DATE=2024-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Current State: atlas"));
}

#[test]
fn test_project_example_is_json() {
    let temp = TempDir::new().expect("Failed to create temp dir");

    let output = pf(temp.path()).args(["project", "example"]).output().unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["name"], "[Project Name]");
}
